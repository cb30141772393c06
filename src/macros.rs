// Compiles a regex literal known to be valid
macro_rules! regex(
    ($s:expr) => (::regex::Regex::new($s).unwrap());
);
