//! JSON import/export of `State`, one state per file.

use crate::error::{Error, Result};
use crate::state::State;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[cfg(unix)]
fn set_standard_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o644);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_standard_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Serializes `state` to `path` as UTF-8 JSON, writing with POSIX mode
/// 0644. On failure the target file is left untouched: the state is
/// serialized into memory first, and only a fully-serialized buffer is
/// written out.
pub fn export_state_json(state: &State, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(state).map_err(Error::from)?;
    let file = File::create(path).map_err(Error::from)?;
    let mut writer = BufWriter::new(file);
    std::io::Write::write_all(&mut writer, &bytes).map_err(Error::from)?;
    std::io::Write::flush(&mut writer).map_err(Error::from)?;
    drop(writer);
    set_standard_permissions(path)?;
    Ok(())
}

/// Deserializes a `State` from the UTF-8 JSON file at `path`.
pub fn import_state_json(path: impl AsRef<Path>) -> Result<State> {
    let file = File::open(path.as_ref()).map_err(Error::from)?;
    let reader = BufReader::new(file);
    let state = serde_json::from_reader(reader).map_err(Error::from)?;
    Ok(state)
}
