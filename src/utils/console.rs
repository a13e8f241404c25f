use lazy_static::lazy_static;

pub mod prelude {
    use ansi_term::Colour;
    use super::USE_COLOUR;
    use lazy_static::lazy_static;

    // Some logging format symbols, potentially with colour.
    lazy_static! {
        pub static ref COLON: String = match *USE_COLOUR {
            true  => Colour::Yellow.paint(":").to_string(),
            false => String::from(":"),
        };
    }
}

lazy_static! {
    /// For those terms that don't support ansi colour set USE_COLOUR to false.
    pub static ref USE_COLOUR: bool = std::env::var("USE_COLOUR")
        .unwrap_or_default()
        .to_lowercase() == "true";
}
