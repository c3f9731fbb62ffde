//! # File and Directory Accessors
//!
//! Path-valued parameters with existence and kind checks. Checks are plain
//! synchronous filesystem probes; the first failure is final.
//!
//! The creatable-path accessors have a side effect: missing directories are
//! created so the caller can write into them straight away.

use crate::parameters::{LIST_SEPARATOR, OS_FILEPATH_CONVERSION_PARAM, Parameters};
use convert::{
    AlwaysValid, And, FileExists, IsDirectory, IsFile, StringConverter, StringToFile,
    StringToOsFile, split_list,
};
use errors::{ConversionError, ParameterError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Path converter selected by the `os_filepath_conversion` parameter.
#[derive(Debug, Clone, Copy)]
enum PathConverter {
    Verbatim,
    OsTranslated
}

impl StringConverter<PathBuf> for PathConverter {
    fn decode(&self, value: &str) -> Result<PathBuf, ConversionError> {
        match self {
            Self::Verbatim => StringToFile.decode(value),
            Self::OsTranslated => StringToOsFile.decode(value)
        }
    }
}

impl Parameters {
    fn path_converter(&self) -> Result<PathConverter, ParameterError> {
        if self.get_optional_boolean(OS_FILEPATH_CONVERSION_PARAM)? == Some(true) {
            Ok(PathConverter::OsTranslated)
        } else {
            Ok(PathConverter::Verbatim)
        }
    }

    fn path_candidates(&self, key: &str) -> Result<(String, Vec<PathBuf>), ParameterError> {
        let converter = self.path_converter()?;
        let raw = self.raw(key)?;
        let candidates = split_list(raw, LIST_SEPARATOR)
            .iter()
            .map(|candidate| {
                converter.decode(candidate).map_err(|source| {
                    ParameterError::conversion(self.full_name(key), candidate.as_str(), "path", source)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((raw.to_string(), candidates))
    }

    fn create_directories(&self, key: &str, value: &str, dir: &Path) -> Result<(), ParameterError> {
        warn!(parameter = %self.full_name(key), path = %dir.display(), "Creating missing directory");
        fs::create_dir_all(dir).map_err(|err| {
            ParameterError::validation(
                self.full_name(key),
                value,
                format!("could not create directory {}: {err}", dir.display())
            )
        })
    }

    /// An existing regular file.
    pub fn get_existing_file(&self, key: &str) -> Result<PathBuf, ParameterError> {
        self.get(
            key,
            self.path_converter()?,
            And::new(FileExists, IsFile),
            "existing file"
        )
    }

    pub fn get_optional_existing_file(&self, key: &str) -> Result<Option<PathBuf>, ParameterError> {
        self.optional(key, Self::get_existing_file)
    }

    /// An existing directory.
    pub fn get_existing_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        self.get(
            key,
            self.path_converter()?,
            And::new(FileExists, IsDirectory),
            "existing directory"
        )
    }

    pub fn get_optional_existing_directory(
        &self,
        key: &str,
    ) -> Result<Option<PathBuf>, ParameterError> {
        self.optional(key, Self::get_existing_directory)
    }

    /// An existing path of either kind.
    pub fn get_existing_file_or_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        self.get(
            key,
            self.path_converter()?,
            FileExists,
            "existing file or directory"
        )
    }

    /// A path with no existence requirement. Prefer a more specific accessor
    /// when one fits.
    pub fn get_file_or_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        self.get(key, StringToFile, AlwaysValid, "file or directory")
    }

    pub fn get_possibly_nonexistent_file(&self, key: &str) -> Result<PathBuf, ParameterError> {
        self.raw(key).map(PathBuf::from)
    }

    /// First entry of a comma-separated list that is an existing file.
    pub fn get_first_existing_file(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let (raw, candidates) = self.path_candidates(key)?;
        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                ParameterError::conversion(
                    self.full_name(key),
                    raw,
                    "existing file",
                    ConversionError::NoExistingCandidate {
                        kind: "file".to_string()
                    }
                )
            })
    }

    /// First entry of a comma-separated list that is an existing directory.
    pub fn get_first_existing_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let (raw, candidates) = self.path_candidates(key)?;
        candidates
            .into_iter()
            .find(|candidate| candidate.is_dir())
            .ok_or_else(|| {
                ParameterError::conversion(
                    self.full_name(key),
                    raw,
                    "existing directory",
                    ConversionError::NoExistingCandidate {
                        kind: "directory".to_string()
                    }
                )
            })
    }

    /// Every entry of a comma-separated list, each of which must be an
    /// existing directory. An empty value is an empty list.
    pub fn get_existing_directories(&self, key: &str) -> Result<Vec<PathBuf>, ParameterError> {
        let converter = self.path_converter()?;
        self.get_list(
            key,
            converter,
            And::new(FileExists, IsDirectory),
            "existing directory"
        )
    }

    /// A directory that exists once this returns: created with its parents
    /// when missing. The returned path is absolute.
    pub fn get_and_make_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let dir = self.get(
            key,
            StringToFile,
            AlwaysValid,
            "existing or creatable directory"
        )?;
        let absolute = std::path::absolute(&dir).map_err(|err| {
            ParameterError::validation(
                self.full_name(key),
                dir.display().to_string(),
                format!("could not resolve absolute path: {err}")
            )
        })?;

        if absolute.exists() {
            if absolute.is_dir() {
                Ok(absolute)
            } else {
                Err(ParameterError::validation(
                    self.full_name(key),
                    absolute.display().to_string(),
                    "Not an existing or creatable directory"
                ))
            }
        } else {
            self.create_directories(key, &absolute.display().to_string(), &absolute)?;
            Ok(absolute)
        }
    }

    /// A file path that may not exist yet. Missing parent directories are
    /// created; an existing directory at the path is rejected.
    pub fn get_creatable_file(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let value = self.raw(key)?;
        let file = PathBuf::from(value);

        if file.exists() {
            if file.is_dir() {
                return Err(ParameterError::validation(
                    self.full_name(key),
                    value,
                    "Requested a file, but directory exists with that filename"
                ));
            }
        } else if let Some(parent) = file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if !parent.exists() {
                self.create_directories(key, value, parent)?;
            }
        }
        Ok(file)
    }

    pub fn get_optional_creatable_file(&self, key: &str) -> Result<Option<PathBuf>, ParameterError> {
        self.optional(key, Self::get_creatable_file)
    }

    /// A directory path that may not exist yet; it is created when missing.
    /// An existing non-directory at the path is rejected.
    pub fn get_creatable_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let value = self.raw(key)?;
        let dir = PathBuf::from(value);

        if dir.exists() {
            if !dir.is_dir() {
                return Err(ParameterError::validation(
                    self.full_name(key),
                    value,
                    "Requested a directory, but a file exists with that filename"
                ));
            }
        } else {
            self.create_directories(key, value, &dir)?;
        }
        Ok(dir)
    }

    /// A creatable directory which must contain no entries.
    pub fn get_empty_directory(&self, key: &str) -> Result<PathBuf, ParameterError> {
        let dir = self.get_creatable_directory(key)?;
        let value = self.raw(key)?;
        let entries = fs::read_dir(&dir)
            .map_err(|err| {
                ParameterError::validation(
                    self.full_name(key),
                    value,
                    format!("could not list directory: {err}")
                )
            })?
            .count();

        if entries != 0 {
            return Err(ParameterError::validation(
                self.full_name(key),
                value,
                format!("Requested an empty directory, but directory contains {entries} files.")
            ));
        }
        Ok(dir)
    }

    /// `root` joined with the value of `key`, which must exist.
    pub fn get_existing_file_relative_to(
        &self,
        root: &Path,
        key: &str,
    ) -> Result<PathBuf, ParameterError> {
        if !root.exists() {
            return Err(ParameterError::constraint(format!(
                "Cannot resolve parameter {} relative to non-existent directory {}",
                self.full_name(key),
                root.display()
            )));
        }
        let resolved = root.join(self.raw(key)?);
        if !resolved.exists() {
            return Err(ParameterError::validation(
                self.full_name(key),
                resolved.display().to_string(),
                "Requested existing file, but the file does not exist"
            ));
        }
        Ok(resolved)
    }

    /// Loads the parameter file named by `key` as a separate root store. The
    /// type registry, if any, carries over.
    pub fn get_sub_parameters(&self, key: &str) -> Result<Parameters, ParameterError> {
        let path = self.get_existing_file(key)?;
        debug!(parameter = %self.full_name(key), path = %path.display(), "Loading sub-parameters");
        let loaded = Parameters::load(&path)?;
        Ok(match self.registry() {
            Some(registry) => loaded.with_registry(registry.clone()),
            None => loaded
        })
    }
}
