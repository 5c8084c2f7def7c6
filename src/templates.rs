use crate::{event::Event, form::AddEventForm, sync::SyncStatus};

pub struct PageView<'a> {
    pub events: &'a [Event],
    pub pending: Option<(usize, &'a Event)>,
    pub form: &'a AddEventForm,
    pub error: Option<&'a str>,
    pub status: &'a SyncStatus,
    pub literal: &'a str,
    pub auto_sync: bool,
}

/// Render the whole management page.
pub fn render_page(view: &PageView) -> String {
    let mut content = String::new();

    content.push_str(&render_form(view.form, view.error));
    content.push_str(&render_list(view.events));
    content.push_str(&render_sync(view.status, view.auto_sync));
    content.push_str(&format!(
        r#"<hr>
<h2>📋 Webソースコード用（コピー用）</h2>
<pre class="code"><code class="language-javascript">{}</code></pre>
"#,
        html_escape(view.literal)
    ));

    if let Some((index, event)) = view.pending {
        content.push_str(&render_confirm(index, event));
    }

    build_page("イベント登録・管理", &content)
}

fn render_form(form: &AddEventForm, error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<div class="error">{}</div>"#, html_escape(message)))
        .unwrap_or_default();

    format!(
        r#"<form class="card" method="post" action="/events">
<h2>新しいイベントを追加</h2>
{error}
<div class="columns">
<div>
<label for="name">イベント名</label>
<input type="text" id="name" name="name" value="{name}">
<label for="date">日付</label>
<input type="date" id="date" name="date" value="{date}" required>
<label for="venue">場所</label>
<input type="text" id="venue" name="venue" value="{venue}">
</div>
<div>
<label for="start">開始時間</label>
<input type="time" id="start" name="start" value="{start}" required>
<label for="end">終了時間</label>
<input type="time" id="end" name="end" value="{end}" required>
</div>
</div>
<button type="submit" class="primary">リストに追加</button>
</form>
"#,
        name = html_escape(&form.name),
        date = html_escape(&form.date),
        venue = html_escape(&form.venue),
        start = html_escape(&form.start),
        end = html_escape(&form.end),
    )
}

fn render_list(events: &[Event]) -> String {
    let mut rows = String::new();

    if events.is_empty() {
        rows.push_str(r#"<p class="muted">イベントはありません</p>"#);
    }

    for (index, event) in events.iter().enumerate() {
        rows.push_str(&format!(
            r#"<div class="row">
<div class="name"><strong>{name}</strong></div>
<div>{date}<br>{venue}</div>
<div>{start} ~ {end}</div>
<div><form method="post" action="/events/{index}/delete"><button type="submit" title="削除">🗑️</button></form></div>
</div>
"#,
            name = html_escape(&event.name),
            date = event.date_text(),
            venue = html_escape(&event.venue),
            start = event.start_text(),
            end = event.end_text(),
        ));
    }

    format!(
        r#"<h2>現在のイベントリスト</h2>
<div class="row header"><div>イベント名</div><div>日付 / 場所</div><div>時間</div><div>削除</div></div>
{rows}"#
    )
}

fn render_sync(status: &SyncStatus, auto_sync: bool) -> String {
    let status = match status {
        SyncStatus::Never => r#"<p class="muted">まだアップロードしていません</p>"#.to_string(),
        SyncStatus::Uploaded { at } => format!(
            r#"<div class="success">サーバーへ自動アップロード完了！ ({})</div>"#,
            at.format("%Y/%m/%d %H:%M:%S UTC")
        ),
        SyncStatus::Failed { at, message } => format!(
            r#"<div class="error">FTPアップロード失敗: {} ({})</div>"#,
            html_escape(message),
            at.format("%Y/%m/%d %H:%M:%S UTC")
        ),
    };

    let mode = if auto_sync {
        r#"<p class="muted">変更後に自動でアップロードします</p>"#
    } else {
        ""
    };

    format!(
        r#"<div class="sync">
{status}
{mode}
<form method="post" action="/sync"><button type="submit">サーバーへアップロード</button></form>
</div>
"#
    )
}

fn render_confirm(index: usize, event: &Event) -> String {
    format!(
        r#"<dialog open data-index="{index}">
<h3>イベントを削除しますか？</h3>
<p>「<strong>{name}</strong>」をリストから削除します。よろしいですか？</p>
<div class="columns">
<form method="post" action="/delete/confirm"><button type="submit" class="primary">はい、削除します</button></form>
<form method="post" action="/delete/cancel"><button type="submit">キャンセル</button></form>
</div>
</dialog>
"#,
        name = html_escape(&event.name),
    )
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
*{{box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;margin:0;}}
.container{{max-width:860px;margin:0 auto;padding:24px;}}
h1{{font-size:28px;}}
h2{{font-size:20px;margin-top:28px;}}
.card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;}}
.columns{{display:grid;grid-template-columns:1fr 1fr;gap:16px;}}
label{{display:block;font-size:13px;color:#555;margin:8px 0 4px;}}
input{{width:100%;padding:8px;border:1px solid #ccc;border-radius:6px;font-size:14px;}}
button{{padding:8px 14px;border:1px solid #ccc;border-radius:6px;background:#fff;cursor:pointer;}}
button.primary{{background:#ff4b4b;border-color:#ff4b4b;color:#fff;margin-top:12px;}}
.row{{display:grid;grid-template-columns:3fr 2fr 2fr 1fr;gap:8px;padding:8px 0;border-bottom:1px solid #eee;align-items:center;}}
.row.header{{font-size:12px;color:#888;}}
.muted{{color:#888;font-size:13px;}}
.error{{background:#ffebee;color:#b71c1c;padding:8px 12px;border-radius:6px;margin:8px 0;}}
.success{{background:#e8f5e9;color:#1b5e20;padding:8px 12px;border-radius:6px;margin:8px 0;}}
.sync{{margin-top:24px;}}
.code{{background:#f0f2f6;padding:12px;border-radius:6px;overflow-x:auto;}}
dialog{{position:fixed;top:30%;border:1px solid #ccc;border-radius:8px;padding:20px;max-width:480px;}}
</style>
</head>
<body>
<div class="container">
<h1>📅 {title}</h1>
{content}
</div>
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
