//! IDF text format: comma separated fields, semicolon terminated records,
//! `!-` annotations carrying field names.

use std::fmt::Write;

use tracing::warn;

use crate::error::{IdfError, IdfResult};
use crate::idd::RecordType;
use crate::record::{Record, Value};
use crate::workspace::Workspace;

const COMMENT_COLUMN: usize = 38;

/// Serialize every record in insertion order.
pub fn write_idf(ws: &Workspace, comments: bool) -> String {
    let mut out = String::new();
    for record in ws.objects() {
        write_record(&mut out, record, comments);
        out.push('\n');
    }
    out
}

fn write_record(out: &mut String, record: &Record, comments: bool) {
    let d = record.descriptor();
    let mut cells: Vec<(String, String)> = d
        .fields
        .iter()
        .zip(record.fields())
        .map(|(def, v)| (v.to_string(), def.name.to_string()))
        .collect();
    for (g, group) in record.groups().iter().enumerate() {
        for (def, v) in d.extensible.iter().zip(group) {
            cells.push((v.to_string(), format!("{} {}", def.name, g + 1)));
        }
    }
    while cells.last().is_some_and(|(v, _)| v.is_empty()) {
        cells.pop();
    }

    out.push_str(d.keyword);
    if cells.is_empty() {
        out.push_str(";\n");
        return;
    }
    out.push_str(",\n");
    let last = cells.len() - 1;
    for (i, (value, name)) in cells.iter().enumerate() {
        let sep = if i == last { ';' } else { ',' };
        let cell = format!("{value}{sep}");
        if comments {
            let _ = writeln!(out, "  {cell:<width$} !- {name}", width = COMMENT_COLUMN);
        } else {
            let _ = writeln!(out, "  {cell}");
        }
    }
}

/// Parse IDF text into a workspace.
///
/// Unknown record types are skipped with a warning; malformed values and
/// out-of-domain choices are errors.
pub fn parse_idf(text: &str) -> IdfResult<Workspace> {
    let stripped: String = text
        .lines()
        .map(|line| line.split('!').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    let mut chunks: Vec<&str> = stripped.split(';').collect();
    let tail = chunks.pop().unwrap_or("");
    if !tail.trim().is_empty() {
        return Err(IdfError::Parse {
            record: chunks.len(),
            message: format!("unterminated record '{}'", tail.trim()),
        });
    }

    let mut ws = Workspace::new();
    for (n, chunk) in chunks.iter().enumerate() {
        let tokens: Vec<&str> = chunk.split(',').map(str::trim).collect();
        let keyword = tokens[0];
        if keyword.is_empty() && tokens.len() == 1 {
            continue;
        }
        let Some(record_type) = RecordType::from_keyword(keyword) else {
            warn!(keyword, "skipping unknown record type");
            continue;
        };
        ws.insert(parse_record(n, record_type, &tokens[1..])?);
    }
    Ok(ws)
}

fn parse_record(n: usize, record_type: RecordType, raw: &[&str]) -> IdfResult<Record> {
    let d = record_type.descriptor();
    let fixed = d.fields.len();
    if raw.len() > fixed && !d.is_extensible() {
        return Err(IdfError::Parse {
            record: n,
            message: format!("{} takes at most {} fields, got {}", d.keyword, fixed, raw.len()),
        });
    }

    let mut record = Record::new(record_type);
    let mut group: Vec<Value> = Vec::new();
    for (i, text) in raw.iter().enumerate() {
        let def = if i < fixed {
            &d.fields[i]
        } else {
            &d.extensible[(i - fixed) % d.extensible.len()]
        };
        let value = Value::parse(text, def.kind).map_err(|message| IdfError::Parse {
            record: n,
            message: format!("{} '{}': {}", d.keyword, def.name, message),
        })?;
        if i < fixed {
            record.set_field(i, value)?;
        } else {
            group.push(value);
            if group.len() == d.extensible.len() {
                record.push_group(std::mem::take(&mut group))?;
            }
        }
    }
    if !group.is_empty() {
        record.push_group(group)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_comments_and_terminator() {
        let mut ws = Workspace::new();
        let h = ws.create_named(RecordType::ScheduleConstant, "On").unwrap();
        ws.set_field_by_name(h, "Hourly Value", Value::Real(1.0))
            .unwrap();

        let text = write_idf(&ws, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Schedule:Constant,");
        assert!(lines[1].starts_with("  On,"));
        assert!(lines[1].ends_with("!- Name"));
        assert!(lines[3].starts_with("  1;"));
        assert!(lines[3].ends_with("!- Hourly Value"));
    }

    #[test]
    fn trailing_empty_fields_are_trimmed() {
        let mut ws = Workspace::new();
        ws.create_named(RecordType::BoilerHotWater, "B").unwrap();
        let text = write_idf(&ws, false);
        assert_eq!(text, "Boiler:HotWater,\n  B;\n\n");
    }

    #[test]
    fn extensible_fields_are_numbered() {
        let mut ws = Workspace::new();
        let h = ws.create_named(RecordType::BranchList, "BL").unwrap();
        ws.push_group(h, vec![Value::text("B1")]).unwrap();
        ws.push_group(h, vec![Value::text("B2")]).unwrap();
        let text = write_idf(&ws, true);
        assert!(text.contains("!- Branch Name 1"));
        assert!(text.contains("!- Branch Name 2"));
    }

    #[test]
    fn parse_skips_unknown_types() {
        let text = "Version,9.6;\nZone,\n  Office;  !- Name\n";
        let ws = parse_idf(text).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.objects_by_type(RecordType::Zone)[0].name(), Some("Office"));
    }

    #[test]
    fn parse_rejects_unterminated_record() {
        assert!(matches!(
            parse_idf("Zone, Office"),
            Err(IdfError::Parse { .. })
        ));
    }

    #[test]
    fn parse_rejects_illegal_choice() {
        let text = "Boiler:HotWater, B, Wood;";
        assert!(matches!(parse_idf(text), Err(IdfError::Validation(_))));
    }

    #[test]
    fn parse_groups_extensible_fields() {
        let text = "PlantEquipmentList, L, Boiler:HotWater, B1, Chiller:Electric:EIR, C1;";
        let ws = parse_idf(text).unwrap();
        let list = ws.objects_by_type(RecordType::PlantEquipmentList)[0];
        assert_eq!(list.group_count(), 2);
        assert_eq!(list.group_string(1, "Equipment Name"), Some("C1"));
    }
}
