//! Types for argument values.

use std::{
    error, fmt,
    fs::File,
    io::{self, BufReader},
    marker::PhantomData,
    str::FromStr,
};


//------------ JsonFile ------------------------------------------------------

/// The content of a JSON file given by its path.
///
/// The `Msg` type names the kind of file in error messages.
#[derive(Clone, Debug)]
pub struct JsonFile<T, Msg> {
    pub content: T,
    marker: PhantomData<Msg>,
}

impl<T, Msg> JsonFile<T, Msg> {
    pub fn into_content(self) -> T {
        self.content
    }
}

impl<T, Msg> FromStr for JsonFile<T, Msg>
where
    T: serde::de::DeserializeOwned,
    Msg: Default + fmt::Display
{
    type Err = JsonFileError<Msg>;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let file = File::open(path).map_err(|err| JsonFileError::Io(path.into(), Default::default(), err))?;
        serde_json::from_reader::<_, T>(BufReader::new(file))
            .map(|content| Self { content, marker: PhantomData })
            .map_err(|err| JsonFileError::Parse(path.into(), Default::default(), err))
    }
}


//------------ JsonFileError -------------------------------------------------

#[derive(Debug)]
pub enum JsonFileError<Msg> {
    Io(String, Msg, io::Error),
    Parse(String, Msg, serde_json::Error),
}

impl<Msg: fmt::Display> fmt::Display for JsonFileError<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(path, msg, err) => write!(f, "Failed to read {} file '{}': {}", msg, path, err),
            Self::Parse(path, msg, err) => write!(f, "Failed to parse {} file '{}': {}", msg, path, err),
        }
    }
}

impl<Msg: fmt::Display + fmt::Debug> error::Error for JsonFileError<Msg> {}


//------------ Tests ---------------------------------------------------------
