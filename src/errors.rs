use std::time::Duration;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    IO(#[cause] ::std::io::Error),
    #[fail(display = "{}", _0)]
    Image(#[cause] ::image::ImageError),
    #[fail(display = "{}", _0)]
    Json(#[cause] ::serde_json::Error),
    #[fail(display = "Locator {} is malformed.", _0)]
    MalformedLocator(String),
    #[fail(display = "Undefined schema {}.", _0)]
    SchemaNotFound(String),
    #[fail(display = "Undefined Path {:?}.", _0)]
    FileNotFound(::std::path::PathBuf),
    #[fail(display = "Preloading did not finish within {:?}.", _0)]
    Timeout(Duration),
    #[fail(display = "{}", _0)]
    Malformed(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<::std::io::Error> for Error {
    fn from(err: ::std::io::Error) -> Self {
        Error::IO(err)
    }
}

impl From<::image::ImageError> for Error {
    fn from(err: ::image::ImageError) -> Self {
        Error::Image(err)
    }
}

impl From<::serde_json::Error> for Error {
    fn from(err: ::serde_json::Error) -> Self {
        Error::Json(err)
    }
}
