use services::SessionEffect;

pub(super) fn effect_script(effect: SessionEffect) -> &'static str {
    match effect {
        SessionEffect::RequestFullscreen => {
            r"(function() {
                const el = document.documentElement;
                if (!document.fullscreenElement && el.requestFullscreen) {
                    el.requestFullscreen().catch(() => {});
                }
            })();"
        }
        SessionEffect::ExitFullscreen => {
            r"(function() {
                if (document.fullscreenElement && document.exitFullscreen) {
                    document.exitFullscreen().catch(() => {});
                }
            })();"
        }
    }
}

/// Installs or removes the "leave this page?" prompt.
pub(super) fn unload_guard_script(active: bool) -> &'static str {
    if active {
        r"(function() {
            if (!window.__mockTestUnloadGuard) {
                window.__mockTestUnloadGuard = (event) => {
                    event.preventDefault();
                    event.returnValue = 'Your test is in progress. Are you sure you want to leave?';
                    return event.returnValue;
                };
                window.addEventListener('beforeunload', window.__mockTestUnloadGuard);
            }
        })();"
    } else {
        r"(function() {
            if (window.__mockTestUnloadGuard) {
                window.removeEventListener('beforeunload', window.__mockTestUnloadGuard);
                window.__mockTestUnloadGuard = null;
            }
        })();"
    }
}
