//! Download names for pipeline artifacts.
//!
//! A name splits at its last `.`; without one the whole string is the
//! extension and the stem is empty, so `archive` renders back as `.archive`
//! once rebuilt. Encoded artifacts keep the original extension inside the
//! stem (`photo.png` → `photo.png.hamming`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::FileRecord;

pub const HAMMING_EXTENSION: &str = "hamming";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileName {
    stem: String,
    extension: String,
}

impl FileName {
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((stem, extension)) => Self {
                stem: stem.to_owned(),
                extension: extension.to_owned(),
            },
            None => Self {
                stem: String::new(),
                extension: name.to_owned(),
            },
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn append_to_stem(mut self, suffix: &str) -> Self {
        self.stem.push_str(suffix);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_owned();
        self
    }

    /// `stem.extension`, always with exactly one separating dot.
    pub fn render(&self) -> String {
        format!("{}.{}", self.stem, self.extension)
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stem, self.extension)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown artifact `{0}`, expected one of: encoded, corrupted-encoded, corrupted-plain, recovered")]
pub struct UnknownArtifact(pub String);

/// One of the four downloadable buffers of a [`FileRecord`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Artifact {
    /// `encoded`
    Encoded,
    /// `corrupted`
    CorruptedEncoded,
    /// lenient decode of `corrupted`
    CorruptedPlain,
    /// strict decode of `corrupted`
    Recovered,
}

impl Artifact {
    pub const ALL: [Artifact; 4] = [
        Artifact::Encoded,
        Artifact::CorruptedEncoded,
        Artifact::CorruptedPlain,
        Artifact::Recovered,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Artifact::Encoded => "encoded",
            Artifact::CorruptedEncoded => "corrupted-encoded",
            Artifact::CorruptedPlain => "corrupted-plain",
            Artifact::Recovered => "recovered",
        }
    }

    pub fn file_name(self, original: &str) -> FileName {
        let name = FileName::parse(original);
        match self {
            Artifact::Encoded => {
                let suffix = format!(".{}", name.extension());
                name.append_to_stem(&suffix).with_extension(HAMMING_EXTENSION)
            }
            Artifact::CorruptedEncoded => {
                let suffix = format!("_corrupted.{}", name.extension());
                name.append_to_stem(&suffix).with_extension(HAMMING_EXTENSION)
            }
            Artifact::CorruptedPlain => name.append_to_stem("_corrupted"),
            Artifact::Recovered => name.append_to_stem("_recovered"),
        }
    }

    pub fn derive_name(self, original: &str) -> String {
        self.file_name(original).render()
    }

    pub fn bytes(self, record: &FileRecord) -> &[u8] {
        match self {
            Artifact::Encoded => record.encoded(),
            Artifact::CorruptedEncoded => record.corrupted(),
            Artifact::CorruptedPlain => record.decoded_unfixed(),
            Artifact::Recovered => record.decoded_fixed(),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.slug())
    }
}

impl FromStr for Artifact {
    type Err = UnknownArtifact;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Artifact::ALL
            .into_iter()
            .find(|a| a.slug() == s)
            .ok_or_else(|| UnknownArtifact(s.to_owned()))
    }
}
