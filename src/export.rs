use crate::event::Event;

pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Headerless CSV, one `name,date,start,end,venue` line per event.
pub fn to_csv(events: &[Event]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for event in events {
        writer.write_record(event.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;

    // Every field is valid UTF-8, so is the output.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The CSV body as written to disk and uploaded: BOM first.
pub fn to_csv_file_bytes(events: &[Event]) -> Result<Vec<u8>, csv::Error> {
    let csv = to_csv(events)?;
    let mut bytes = Vec::with_capacity(BOM.len() + csv.len());
    bytes.extend_from_slice(BOM);
    bytes.extend_from_slice(csv.as_bytes());
    Ok(bytes)
}

/// Embeds the CSV into a JavaScript template literal for the public site.
pub fn to_js_literal(events: &[Event]) -> Result<String, csv::Error> {
    let csv = to_csv(events)?;
    let body = csv.trim_end_matches('\n');
    Ok(format!("const rawData = `\n{}\n`;", escape_template(body)))
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}
