//! Page shell and the in-page scripts for filtering and live refresh

use super::escape_html;

/// Wrap `body` (already-escaped HTML) in the shared page shell
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · Sacred QA</title>
    <style>{style}</style>
</head>
<body>
<main>
<h1>{title}</h1>
{body}
</main>
<script>{script}</script>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        body = body,
        script = SCRIPT,
    )
}

/// Plain-text failure shown in place of a table or beside a form
pub fn error_message(message: &str) -> String {
    format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(message))
}

pub fn success_message(message: &str) -> String {
    format!(r#"<p class="success" role="status">{}</p>"#, escape_html(message))
}

/// Container whose contents the page replaces from `refresh_url` every
/// `interval_ms`.
pub fn live_region(refresh_url: &str, interval_ms: u64, contents: &str) -> String {
    format!(
        r#"<div class="live" data-refresh-url="{}" data-refresh-ms="{}">{}</div>"#,
        escape_html(refresh_url),
        interval_ms,
        contents
    )
}

const STYLE: &str = r#"
    * { box-sizing: border-box; }
    body { font-family: sans-serif; margin: 0; padding: 24px; color: #1f2937; }
    main { max-width: 1100px; margin: 0 auto; }
    h1 { font-size: 24px; margin-bottom: 16px; }
    h2 { font-size: 18px; margin-bottom: 8px; }
    nav a { margin-right: 12px; }
    section { margin-bottom: 32px; }
    form { display: flex; gap: 8px; margin-bottom: 12px; }
    form input[type=text] { flex: 1; padding: 8px; border: 1px solid #ccc; }
    button { padding: 8px 12px; color: white; border: 0; background: #2563eb; cursor: pointer; }
    button.ask { background: #16a34a; }
    button:disabled { opacity: 0.5; cursor: not-allowed; }
    input.filter { width: 100%; padding: 8px; margin-bottom: 8px; border: 1px solid #ccc; }
    table { width: 100%; border-collapse: collapse; font-size: 14px; }
    th, td { text-align: left; padding: 6px 8px; vertical-align: top; }
    th, td { border-bottom: 1px solid #e5e7eb; }
    th { background: #f3f4f6; }
    pre { background: #f3f4f6; padding: 12px; border-radius: 6px; white-space: pre-wrap; }
    .count { color: #6b7280; font-size: 12px; }
    .error { color: #b91c1c; }
    .success { color: #15803d; }
"#;

const SCRIPT: &str = r#"
function applyFilter(input) {
    const table = document.getElementById(input.dataset.filterFor);
    if (!table) return;
    const column = Number(table.dataset.filterColumn);
    const needle = input.value.toLowerCase();
    for (const row of table.tBodies[0].rows) {
        const cell = row.cells[column];
        const text = cell ? cell.textContent.toLowerCase() : '';
        row.hidden = needle !== '' && !text.includes(needle);
    }
}

document.addEventListener('input', (event) => {
    if (event.target.matches('input[data-filter-for]')) applyFilter(event.target);
});

document.querySelectorAll('form[data-single-submit]').forEach((form) => {
    form.addEventListener('submit', (event) => {
        const button = form.querySelector('button[type=submit]');
        if (button.disabled) { event.preventDefault(); return; }
        button.disabled = true;
    });
});

const live = document.querySelector('[data-refresh-url]');
let timer = null;

async function refreshLive() {
    try {
        const headers = { 'Accept': 'text/html' };
        const response = await fetch(live.dataset.refreshUrl, { headers });
        live.innerHTML = await response.text();
    } catch (err) {
        const p = document.createElement('p');
        p.className = 'error';
        p.textContent = 'Refresh failed: ' + err;
        live.replaceChildren(p);
    }
}

function startLive() {
    if (live && timer === null) {
        timer = setInterval(refreshLive, Number(live.dataset.refreshMs));
    }
}

function stopLive() {
    if (timer !== null) { clearInterval(timer); timer = null; }
}

startLive();
window.addEventListener('pagehide', stopLive);

// Restored from the back/forward cache: undo the pagehide teardown
window.addEventListener('pageshow', (event) => {
    if (!event.persisted) return;
    document.querySelectorAll('form[data-single-submit] button[type=submit]')
        .forEach((button) => { button.disabled = false; });
    startLive();
});
"#;
