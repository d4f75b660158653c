//! Hand a field to an external viewer
//!
//! The viewer command comes from the `LEVELSET_SHOW_COMMAND` environment
//! variable. A `%f` in the command is replaced by the temporary file path;
//! otherwise the path is appended as the last argument. The viewer is
//! spawned and not waited on.

use crate::{IoError, IoResult, rescale_for_display, save};
use levelset_core::Field;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Environment variable naming the viewer command
pub const SHOW_COMMAND_VAR: &str = "LEVELSET_SHOW_COMMAND";

static SHOW_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write `field` to a temporary file and open it in the configured viewer
///
/// 2D fields are rescaled to 8 bits and written as PNG (when PNG support
/// is enabled); anything else uses the native field format.
///
/// Returns the path of the temporary file.
pub fn show(field: &Field) -> IoResult<PathBuf> {
    let command = std::env::var(SHOW_COMMAND_VAR)
        .ok()
        .filter(|c| !c.trim().is_empty())
        .ok_or(IoError::ViewerUnavailable(SHOW_COMMAND_VAR))?;

    let path = temp_path(field.ndim());
    if cfg!(feature = "png-format") && field.ndim() == 2 {
        save(&rescale_for_display(field), &path)?;
    } else {
        save(field, &path)?;
    }

    let path_str = path.to_string_lossy().into_owned();
    let mut args: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if args.iter().any(|a| a.contains("%f")) {
        for arg in &mut args {
            *arg = arg.replace("%f", &path_str);
        }
    } else {
        args.push(path_str);
    }

    let (program, rest) = args
        .split_first()
        .ok_or(IoError::ViewerUnavailable(SHOW_COMMAND_VAR))?;
    Command::new(program).args(rest).spawn()?;
    log::info!("showing {} with {}", path.display(), program);

    Ok(path)
}

fn temp_path(ndim: usize) -> PathBuf {
    let n = SHOW_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ext = if cfg!(feature = "png-format") && ndim == 2 {
        "png"
    } else {
        "lsf"
    };
    std::env::temp_dir().join(format!("levelset_show_{}_{}.{}", std::process::id(), n, ext))
}
