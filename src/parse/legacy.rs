use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ParseError;
use crate::config::GraphOptions;
use crate::model::{day_end, day_start, Person, Task, TaskStyle, TimelineModel};
use crate::theme::{Color, Palette};

/// `name [NN%] [, url]` — the shape of every person line. A line that
/// fails this pattern is fatal for the whole instance.
static PERSON_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S*)\s*(?:\s+(\d+)%\s*)?(?:,\s*(\S*)\s*)?$").unwrap());

/// A task block being assembled: the header line has been read, the date
/// line may still be pending.
struct PendingTask {
    group: String,
    name: String,
    style: TaskStyle,
    color: Color,
    url: Option<String>,
    commit: Option<String>,
    previous_task: Option<usize>,
    dates: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl PendingTask {
    fn finish(self) -> Result<Task, ParseError> {
        let (from, to) = self.dates.ok_or(ParseError::IncompleteBlock {
            group: self.group.clone(),
        })?;
        Ok(Task {
            group: self.group,
            name: self.name,
            style: self.style,
            color: self.color,
            order: 0,
            from,
            to,
            url: self.url,
            commit: self.commit,
            previous_task: self.previous_task,
        })
    }
}

/// Parse the legacy line grammar: blocks separated by blank lines, each
/// block a header line, a date line, then zero or more person lines.
pub fn parse(
    text: &str,
    options: &GraphOptions,
    palette: &mut Palette,
) -> Result<TimelineModel, ParseError> {
    let format = options.date_format();
    let mut tasks: Vec<Task> = Vec::new();
    let mut people: Vec<Person> = Vec::new();
    let mut pending: Option<PendingTask> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            if let Some(block) = pending.take() {
                tasks.push(block.finish()?);
            }
            continue;
        }

        match &mut pending {
            // Header: `Group[, Name[, Url[, Commit]]]`.
            None => {
                let mut parts = line.split(',').map(str::trim);
                let header = parts.next().unwrap_or_default();
                let (style, group) = match header.strip_prefix('*') {
                    Some(rest) => (TaskStyle::Bold, rest.trim_start()),
                    None => (TaskStyle::Normal, header),
                };
                pending = Some(PendingTask {
                    group: group.to_string(),
                    name: parts.next().unwrap_or_default().to_string(),
                    style,
                    color: palette.color_for(group),
                    url: parts.next().map(str::to_string).filter(|s| !s.is_empty()),
                    commit: parts.next().map(str::to_string).filter(|s| !s.is_empty()),
                    previous_task: tasks.iter().rposition(|t| t.group == group),
                    dates: None,
                });
            }

            // Date line: two date tokens, any other characters treated
            // as separators.
            Some(block) if block.dates.is_none() => {
                let cleaned: String = line
                    .chars()
                    .map(|c| {
                        if c.is_ascii_digit() || c == '-' || c == '/' {
                            c
                        } else {
                            ' '
                        }
                    })
                    .collect();
                let mut tokens = cleaned.split_whitespace();
                let (from, to) = match (tokens.next(), tokens.next()) {
                    (Some(a), Some(b)) => (parse_date(a, format)?, parse_date(b, format)?),
                    _ => {
                        return Err(ParseError::BadDateLine {
                            group: block.group.clone(),
                            line: line.to_string(),
                        })
                    }
                };
                block.dates = Some((day_start(from), day_end(to)));
            }

            // Person lines.
            Some(block) => {
                let captures =
                    PERSON_LINE
                        .captures(line)
                        .ok_or_else(|| ParseError::BadPersonLine {
                            line: line.to_string(),
                        })?;
                let involvement = captures
                    .get(2)
                    .and_then(|m| m.as_str().parse::<i64>().ok())
                    .map(|n| n.clamp(0, 100) as u8)
                    .unwrap_or(100);
                let (from, to) = block.dates.expect("person lines follow the date line");
                people.push(Person {
                    person_group: captures[1].to_string(),
                    order: 0,
                    from,
                    to,
                    display_name: if block.name.is_empty() {
                        block.group.clone()
                    } else {
                        block.name.clone()
                    },
                    task_group: block.group.clone(),
                    task_order: 0,
                    color: block.color,
                    involvement,
                    url: captures.get(3).map(|m| m.as_str().to_string()),
                    // The block's task is pushed when the block closes.
                    owning_task: Some(tasks.len()),
                });
            }
        }
    }

    if let Some(block) = pending.take() {
        tasks.push(block.finish()?);
    }

    Ok(TimelineModel::new(tasks, people))
}

fn parse_date(value: &str, format: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| ParseError::InvalidDate {
        value: value.to_string(),
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse_text(text: &str) -> Result<TimelineModel, ParseError> {
        parse(text, &GraphOptions::default(), &mut Palette::new())
    }

    const PAYLOAD: &str = "\
* Alpha, Kickoff, https://example.com/alpha, 0123456abcdef\n\
from 2024-01-01 to 2024-01-05.\n\
ann 50%\n\
bob, https://example.com/bob\n\
\n\
Beta\n\
2024-02-01 2024-02-10\n\
\n\
Alpha, Wrap-up\n\
2024-03-01 2024-03-02\n";

    #[test]
    fn blocks_parse_into_tasks_and_people() {
        let model = parse_text(PAYLOAD).unwrap();
        assert_eq!(model.tasks.len(), 3);
        assert_eq!(model.people.len(), 2);

        let alpha = &model.tasks[0];
        assert_eq!(alpha.group, "Alpha");
        assert_eq!(alpha.name, "Kickoff");
        assert_eq!(alpha.style, TaskStyle::Bold);
        assert_eq!(alpha.url.as_deref(), Some("https://example.com/alpha"));
        assert_eq!(alpha.commit.as_deref(), Some("0123456abcdef"));
        assert_eq!(
            alpha.from.date(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        // Exclusive end: the day after the last inclusive day.
        assert_eq!(alpha.to.date(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    }

    #[test]
    fn person_lines_capture_involvement_and_url() {
        let model = parse_text(PAYLOAD).unwrap();
        let ann = &model.people[0];
        assert_eq!(ann.person_group, "ann");
        assert_eq!(ann.involvement, 50);
        assert_eq!(ann.url, None);
        assert_eq!(ann.task_group, "Alpha");
        assert_eq!(ann.display_name, "Kickoff");
        assert_eq!(ann.owning_task, Some(0));

        let bob = &model.people[1];
        assert_eq!(bob.involvement, 100);
        assert_eq!(bob.url.as_deref(), Some("https://example.com/bob"));
    }

    #[test]
    fn repeated_group_links_back_to_prior_task() {
        let model = parse_text(PAYLOAD).unwrap();
        assert_eq!(model.tasks[0].previous_task, None);
        assert_eq!(model.tasks[1].previous_task, None);
        // "Alpha, Wrap-up" links back to the first Alpha task.
        assert_eq!(model.tasks[2].previous_task, Some(0));
    }

    #[test]
    fn last_block_closes_without_trailing_blank_line() {
        let model = parse_text("Solo\n2024-01-01 2024-01-02").unwrap();
        assert_eq!(model.tasks.len(), 1);
        assert_eq!(model.tasks[0].name, "");
    }

    #[test]
    fn bad_person_line_is_fatal() {
        let err = parse_text("Alpha\n2024-01-01 2024-01-02\nAnn Smith extra words\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::BadPersonLine { .. }));
    }

    #[test]
    fn missing_second_date_is_fatal() {
        let err = parse_text("Alpha\n2024-01-01\nann\n").unwrap_err();
        assert!(matches!(err, ParseError::BadDateLine { .. }));
    }

    #[test]
    fn header_without_dates_is_fatal() {
        let err = parse_text("Alpha, Kickoff\n").unwrap_err();
        assert!(matches!(err, ParseError::IncompleteBlock { .. }));
    }
}
