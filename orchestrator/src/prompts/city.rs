//! City selection instruction

pub const CITY_TASK: &str = "Choose a random city in India. Only return the city name.";

pub const CITY_EXPECTED_OUTPUT: &str = "A single city name in India.";
