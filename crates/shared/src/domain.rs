use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ContactId);

/// Gender as stored by the backend. The known values are the two the list
/// filters on; anything else round-trips unchanged through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Feminino,
    Masculino,
    Other(String),
}

impl Gender {
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Feminino => "Feminino",
            Gender::Masculino => "Masculino",
            Gender::Other(value) => value,
        }
    }

    /// Icon class used by list renderers.
    pub fn icon_class(&self) -> &'static str {
        match self {
            Gender::Feminino => "fas fa-venus",
            _ => "fas fa-mars",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Gender::Feminino => '♀',
            Gender::Masculino => '♂',
            Gender::Other(_) => '·',
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Feminino" => Gender::Feminino,
            "Masculino" => Gender::Masculino,
            _ => Gender::Other(value),
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Gender {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Gender::from(s.trim().to_string()))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
