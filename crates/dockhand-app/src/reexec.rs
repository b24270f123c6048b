//! Re-exec trampoline for helper processes.
//!
//! A helper is a named function that runs instead of the normal startup when
//! the process is launched with `argv[0]` equal to that name. Parent
//! processes spawn `/proc/self/exe` with the helper name as `argv[0]` to run a
//! restricted task in a separate process.
//!
//! The binary registers no helpers of its own: the registry starts empty and
//! `init` falls through to normal startup. Code embedding this crate calls
//! [`register`] before [`crate::run`] to add helpers.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::process::ExitCode;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::error;

use crate::error::{AppError, AppResult};

/// Entry point of a re-exec helper.
pub type Helper = fn() -> ExitCode;

static HELPERS: Lazy<Mutex<HashMap<String, Helper>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Register `helper` under `name`.
///
/// # Errors
///
/// Returns `AppError::DuplicateHelper` if `name` is already taken.
pub fn register(name: &str, helper: Helper) -> AppResult<()> {
    let mut helpers = lock_helpers();
    if helpers.contains_key(name) {
        return Err(AppError::DuplicateHelper {
            name: name.to_string(),
        });
    }
    helpers.insert(name.to_string(), helper);
    Ok(())
}

/// Run the helper registered under `argv0`, if any.
///
/// Returns `None` when `argv0` is not a helper name and normal startup should
/// continue.
#[must_use]
pub fn init(argv0: Option<&OsStr>) -> Option<ExitCode> {
    let name = argv0?.to_str()?;
    let helper = lock_helpers().get(name).copied()?;
    Some(helper())
}

fn lock_helpers() -> MutexGuard<'static, HashMap<String, Helper>> {
    match HELPERS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("re-exec helper registry poisoned; continuing with recovered guard");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn helper_exit() -> ExitCode {
        ExitCode::from(42)
    }

    #[test]
    fn registered_helper_short_circuits_startup() -> AppResult<()> {
        register("dockhand-test-helper", helper_exit)?;
        let argv0 = OsString::from("dockhand-test-helper");
        let code = init(Some(argv0.as_os_str()));
        assert_eq!(code, Some(ExitCode::from(42)));
        Ok(())
    }

    #[test]
    fn unknown_names_continue_normal_startup() {
        let argv0 = OsString::from("/usr/bin/openshift-git-clone");
        assert!(init(Some(argv0.as_os_str())).is_none());
        assert!(init(None).is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() -> AppResult<()> {
        register("dockhand-duplicate-helper", helper_exit)?;
        let err = register("dockhand-duplicate-helper", helper_exit);
        assert!(matches!(err, Err(AppError::DuplicateHelper { .. })));
        Ok(())
    }
}
