use failure::Fail;

#[derive(Debug, Fail)]
pub enum HcnError {
    #[fail(display = "Unable to read file '{}'", _0)]
    ModelLoad(String),
    #[fail(
        display = "No template found for act '{}' and response '{}'",
        act, response
    )]
    TemplateNotFound { act: String, response: String },
    #[fail(
        display = "Invalid shape for {}: expected {} but found {}",
        name, expected, found
    )]
    ShapeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[fail(display = "Unknown action id: {}", _0)]
    UnknownAction(usize),
    #[fail(display = "Missing input '{}' in turn context", _0)]
    MissingInput(String),
    #[fail(display = "Unknown component: '{}'", _0)]
    UnknownComponent(String),
}

pub type Result<T> = ::std::result::Result<T, ::failure::Error>;
