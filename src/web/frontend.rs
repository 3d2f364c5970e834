//! Embedded HTML/CSS/JS frontend for the pricelens web dashboard.
//!
//! The entire page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>pricelens</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: baseline;
  gap: 12px;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; font-family: var(--mono); color: var(--accent); }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.layout { display: grid; grid-template-columns: 300px 1fr; gap: 24px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
}
.card h2 {
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--text-muted);
  margin-bottom: 10px;
}

select {
  width: 100%;
  padding: 6px 8px;
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  margin-bottom: 16px;
}

.products { max-height: 360px; overflow-y: auto; margin-bottom: 16px; }
.products label { display: flex; gap: 8px; align-items: center; padding: 3px 0; cursor: pointer; }
.products .price { margin-left: auto; color: var(--text-muted); font-family: var(--mono); font-size: 12px; }
.empty { color: var(--text-muted); font-style: italic; }

.actions { display: flex; gap: 8px; align-items: center; }
button {
  padding: 6px 14px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--bg);
  color: var(--text);
  cursor: pointer;
}
button.primary { background: var(--accent); border-color: var(--accent); color: #0d1117; font-weight: 600; }
button:disabled { opacity: 0.4; cursor: not-allowed; }

.spinner {
  width: 16px; height: 16px;
  border: 2px solid var(--border);
  border-top-color: var(--accent);
  border-radius: 50%;
  animation: spin 0.8s linear infinite;
  display: none;
}
.spinner.on { display: inline-block; }
@keyframes spin { to { transform: rotate(360deg); } }

#chart-title { font-size: 16px; margin-bottom: 8px; min-height: 24px; }
#chart svg { width: 100%; height: 420px; }
#chart .bar { fill: var(--accent); }
#chart .bar.placeholder { fill: var(--border); }
#chart text { fill: var(--text-muted); font-size: 11px; }
#chart .value { fill: var(--text); }
#chart .axis { stroke: var(--border); }

.notes { margin-top: 12px; font-size: 12px; color: var(--yellow); }
.diagnostics { margin-top: 16px; font-size: 12px; color: var(--text-muted); font-family: var(--mono); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>pricelens</h1>
    <span class="subtitle">filter a category, pick products, chart their prices</span>
  </header>

  <div class="layout">
    <div class="card">
      <h2>Category</h2>
      <select id="category"></select>

      <h2>Products</h2>
      <div class="products" id="products"></div>

      <div class="actions">
        <button id="clear">Clear</button>
        <button id="run" class="primary">Run Report</button>
        <span class="spinner" id="spinner"></span>
      </div>
      <div class="diagnostics" id="diagnostics"></div>
    </div>

    <div class="card">
      <div id="chart-title"></div>
      <div id="chart"></div>
      <div class="notes" id="notes"></div>
    </div>
  </div>
</div>

<script>
const $ = (id) => document.getElementById(id);
let pollTimer = null;

function esc(s) {
  return String(s).replace(/[&<>"']/g, (c) => ({
    '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
  }[c]));
}

async function api(path, body) {
  const opts = body === undefined
    ? {}
    : { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) };
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  render(data);
}

function formatValue(chart, v) {
  if (v === null || v === undefined) return 'n/a';
  if (!chart.data_label_format) return String(v);
  return chart.data_label_format.replace('{value:.2}', v.toFixed(2));
}

function renderCategories(state) {
  const sel = $('category');
  const opts = ['<option value="">Select a category</option>']
    .concat(state.categories.map((c) => `<option value="${esc(c)}">${esc(c)}</option>`));
  sel.innerHTML = opts.join('');
  sel.value = state.category;
}

function renderProducts(data) {
  const state = data.state;
  const box = $('products');
  if (!state.category) {
    box.innerHTML = '<div class="empty">No category selected</div>';
    return;
  }
  if (state.products.length === 0) {
    box.innerHTML = '<div class="empty">No products loaded</div>';
    return;
  }
  const selected = new Set(data.selected);
  box.innerHTML = state.products.map((p) => `
    <label>
      <input type="checkbox" data-title="${esc(p.title)}" ${selected.has(p.title) ? 'checked' : ''}>
      <span>${esc(p.title)}</span>
      <span class="price">${p.price === null ? 'n/a' : p.price.toFixed(2)}</span>
    </label>`).join('');
  box.querySelectorAll('input').forEach((el) => {
    el.addEventListener('change', () => api('/api/toggle', { title: el.dataset.title }));
  });
}

function renderChart(chart) {
  $('chart-title').textContent = chart.title;
  const rows = Math.max(chart.x_categories.length, chart.series.length);
  const W = 900, H = 420, left = chart.y_axis_visible ? 60 : 20, bottom = 110, top = 24;
  const plotW = W - left - 10, plotH = H - top - bottom;
  const values = chart.series.filter((v) => v !== null);
  const max = Math.max(1, ...values);
  const slot = rows > 0 ? plotW / rows : plotW;
  const barW = Math.max(4, slot * 0.6);

  let svg = `<svg viewBox="0 0 ${W} ${H}" preserveAspectRatio="none">`;
  svg += `<line class="axis" x1="${left}" y1="${top + plotH}" x2="${W - 10}" y2="${top + plotH}"/>`;
  if (chart.y_axis_visible) {
    svg += `<line class="axis" x1="${left}" y1="${top}" x2="${left}" y2="${top + plotH}"/>`;
    svg += `<text transform="translate(14 ${top + plotH / 2}) rotate(-90)" text-anchor="middle">${esc(chart.y_axis_title)}</text>`;
  }
  for (let i = 0; i < rows; i++) {
    const v = chart.series[i];
    const label = chart.x_categories[i] ?? `#${i + 1}`;
    const cx = left + slot * i + slot / 2;
    if (v !== null && v !== undefined) {
      const h = (v / max) * plotH;
      const cls = chart.placeholder ? 'bar placeholder' : 'bar';
      svg += `<rect class="${cls}" x="${cx - barW / 2}" y="${top + plotH - h}" width="${barW}" height="${h}"/>`;
      if (chart.data_label_format) {
        svg += `<text class="value" x="${cx}" y="${top + plotH - h - 4}" text-anchor="middle">${esc(formatValue(chart, v))}</text>`;
      }
    }
    svg += `<text transform="translate(${cx} ${top + plotH + 12}) rotate(-40)" text-anchor="end">${esc(label)}</text>`;
  }
  svg += '</svg>';
  $('chart').innerHTML = svg;

  const notes = $('notes');
  notes.textContent = chart.x_categories.length !== chart.series.length && !chart.placeholder
    ? `${chart.x_categories.length} labels but ${chart.series.length} values: some selected products have no numeric price.`
    : '';
}

function render(data) {
  const state = data.state;
  renderCategories(state);
  renderProducts(data);
  renderChart(data.chart);

  $('run').disabled = !data.can_run_report;
  $('spinner').classList.toggle('on', state.loading);
  $('diagnostics').innerHTML = data.diagnostics
    .map((d) => `<div>${esc(d.level)} ${esc(d.source)}: ${esc(d.message)}</div>`)
    .join('');

  clearTimeout(pollTimer);
  if (state.loading) {
    pollTimer = setTimeout(() => api('/api/state'), 300);
  }
}

$('category').addEventListener('change', (e) => api('/api/category', { category: e.target.value }));
$('clear').addEventListener('click', () => api('/api/clear', {}));
$('run').addEventListener('click', () => api('/api/report', {}));

api('/api/state').catch((e) => { $('notes').textContent = e.message; });
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_calls_every_api_route() {
        for route in [
            "/api/state",
            "/api/category",
            "/api/toggle",
            "/api/clear",
            "/api/report",
        ] {
            assert!(INDEX_HTML.contains(route), "missing {route}");
        }
    }

    #[test]
    fn page_has_no_external_assets() {
        assert!(!INDEX_HTML.contains("<script src"));
        assert!(!INDEX_HTML.contains("<link "));
    }
}
