use crate::model::QuestionRecord;

pub const CSV_HEADER: [&str; 8] = [
    "Group",
    "Module Code",
    "Module Name",
    "Question ID",
    "Review Mode",
    "Impact Level",
    "Question Text",
    "Helper Text",
];

/// Quotes a field when it contains a comma, quote or line break, doubling inner quotes.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn record_fields(record: &QuestionRecord) -> [&str; 8] {
    [
        record.group.label(),
        &record.module_code,
        &record.module_name,
        &record.question_id,
        record.review_mode.label(),
        &record.impact_level,
        &record.question_text,
        &record.help_text,
    ]
}

/// Header plus one line per record, `\n`-separated, without a trailing newline.
pub fn render_csv(records: &[QuestionRecord]) -> String {
    std::iter::once(render_row(CSV_HEADER))
        .chain(records.iter().map(|r| render_row(record_fields(r))))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleGroup, ReviewMode};

    fn record() -> QuestionRecord {
        QuestionRecord {
            group: ModuleGroup::ServiceSupport,
            module_code: "4.2".into(),
            module_name: "Staff training".into(),
            question_id: "SS-4-2-1".into(),
            review_mode: ReviewMode::PulseCheck,
            impact_level: "high".into(),
            question_text: "Do staff know the \"quiet room\" location?".into(),
            help_text: String::new(),
        }
    }

    #[test]
    fn plain_fields_are_left_alone() {
        assert_eq!(escape_field("Getting In"), "Getting In");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn special_fields_are_quoted() {
        assert_eq!(
            escape_field("Reception, lifts, and ramps"),
            "\"Reception, lifts, and ramps\""
        );
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = render_csv(&[record()]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Group,Module Code,Module Name,Question ID,Review Mode,Impact Level,Question Text,Helper Text"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "Service & Support,4.2,Staff training,SS-4-2-1,Pulse Check,high,\"Do staff know the \"\"quiet room\"\" location?\","
            )
        );
        assert_eq!(lines.next(), None);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn no_records_renders_header_only() {
        assert_eq!(render_csv(&[]), CSV_HEADER.join(","));
    }
}
