//! Live-reload augmentation for synthesized documents
//!
//! A small polling script re-fetches the watched file's raw bytes on a fixed
//! interval and reloads the hosting frame when they change. The first check
//! only records a baseline. Fetch errors are rate-limited in their reporting
//! to avoid log flooding. An always-visible indicator toggles polling on and
//! off when clicked.

use crate::config::PreviewConfig;
use crate::workspace::TaskFileRef;

const SCRIPT_TEMPLATE: &str = r#"
<script>
(function () {
  let lastContent = null;
  let isReloading = false;
  let polling = true;
  let lastErrorLog = 0;
  let pollTimer = null;

  async function checkForChanges() {
    if (isReloading) return;
    try {
      const response = await fetch('__POLL_URL__&t=' + Date.now());
      if (response.ok) {
        const newContent = await response.text();
        if (lastContent === null) {
          lastContent = newContent;
        } else if (lastContent !== newContent) {
          isReloading = true;
          const notification = document.createElement('div');
          notification.textContent = '🔄 Файл изменен, обновляем...';
          notification.style.cssText = 'position: fixed; top: 50px; right: 10px; background: #f59e0b; color: white; padding: 12px 16px; border-radius: 8px; font-size: 14px; font-weight: 600; z-index: 10000; box-shadow: 0 4px 12px rgba(0,0,0,0.3); animation: praktika-slide-in 0.3s ease;';
          document.body.appendChild(notification);
          setTimeout(function () { window.location.reload(); }, __RELOAD_DELAY_MS__);
        }
      }
    } catch (error) {
      if (Date.now() - lastErrorLog > __ERROR_LOG_MS__) {
        console.warn('Live reload check failed:', error);
        lastErrorLog = Date.now();
      }
    }
  }

  function startPolling() {
    if (pollTimer === null) {
      pollTimer = setInterval(checkForChanges, __POLL_INTERVAL_MS__);
    }
  }

  function stopPolling() {
    if (pollTimer !== null) {
      clearInterval(pollTimer);
      pollTimer = null;
    }
  }

  const indicator = document.createElement('div');
  indicator.textContent = '🔄 Live Reload активен';
  indicator.style.cssText = 'position: fixed; top: 10px; right: 10px; background: #10b981; color: white; padding: 8px 12px; border-radius: 6px; font-size: 12px; font-weight: 600; z-index: 9999; box-shadow: 0 2px 8px rgba(0,0,0,0.2); cursor: pointer;';
  indicator.addEventListener('click', function () {
    polling = !polling;
    if (polling) {
      startPolling();
      indicator.textContent = '🔄 Live Reload активен';
      indicator.style.background = '#10b981';
    } else {
      stopPolling();
      indicator.textContent = '⏸️ Live Reload выключен';
      indicator.style.background = '#6b7280';
    }
  });
  document.body.appendChild(indicator);

  const style = document.createElement('style');
  style.textContent = '@keyframes praktika-slide-in { from { opacity: 0; transform: translateX(100%); } to { opacity: 1; transform: translateX(0); } }';
  document.head.appendChild(style);

  startPolling();
  setTimeout(checkForChanges, 1000);
})();
</script>"#;

/// Build the polling script block for one watched file
pub fn build_live_reload_script(file_ref: &TaskFileRef, preview: &PreviewConfig) -> String {
    // serde_urlencoded never fails on a single string pair
    let query = serde_urlencoded::to_string([("file", file_ref.as_str())])
        .unwrap_or_else(|_| format!("file={}", file_ref.as_str()));
    let poll_url = format!("/api/playground?{query}");

    SCRIPT_TEMPLATE
        .replace("__POLL_URL__", &poll_url)
        .replace(
            "__POLL_INTERVAL_MS__",
            &(preview.poll_interval_secs * 1000).to_string(),
        )
        .replace("__RELOAD_DELAY_MS__", &preview.reload_delay_ms.to_string())
        .replace(
            "__ERROR_LOG_MS__",
            &(preview.error_log_interval_secs * 1000).to_string(),
        )
}

/// Splice an augmentation block into a finished document: before `</body>`
/// when one exists, appended at the end otherwise.
pub fn inject_before_body_end(document: &str, block: &str) -> String {
    match document.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(document.len() + block.len());
            out.push_str(&document[..idx]);
            out.push_str(block);
            out.push_str(&document[idx..]);
            out
        }
        None => format!("{document}{block}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_carries_config_values() {
        let r = TaskFileRef::parse("01-intro/a.problem.jsx").unwrap();
        let preview = PreviewConfig::default();
        let script = build_live_reload_script(&r, &preview);

        assert!(script.contains("/api/playground?file=01-intro%2Fa.problem.jsx"));
        assert!(script.contains("setInterval(checkForChanges, 3000)"));
        assert!(script.contains("window.location.reload(); }, 1000"));
        assert!(script.contains("lastErrorLog > 10000"));
        assert!(!script.contains("__POLL_URL__"));
    }

    #[test]
    fn test_inject_before_body_end() {
        let doc = "<html><body><p>x</p></body></html>";
        let out = inject_before_body_end(doc, "<script>s</script>");
        assert_eq!(out, "<html><body><p>x</p><script>s</script></body></html>");
    }

    #[test]
    fn test_inject_appends_without_body() {
        let doc = "<p>x</p>";
        let out = inject_before_body_end(doc, "<script>s</script>");
        assert_eq!(out, "<p>x</p><script>s</script>");
    }
}
