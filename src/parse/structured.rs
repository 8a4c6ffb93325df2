use chrono::NaiveDate;
use serde::Deserialize;

use super::ParseError;
use crate::config::GraphOptions;
use crate::model::{day_end, day_start, Person, Task, TaskStyle, TimelineModel};
use crate::theme::{Color, Palette};

/// The structured JSON payload grammar, as authored in the host document.
/// Unknown fields are tolerated; shape mismatches reject the whole payload
/// and route it to the legacy parser.
#[derive(Debug, Deserialize)]
pub struct RawPayload {
    pub tasks: Vec<RawTask>,
    #[serde(default)]
    pub people: Vec<RawPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub task_name: String,
    pub sub_task_name: Option<String>,
    pub style: Option<TaskStyle>,
    pub color: Option<Color>,
    pub order: Option<Number>,
    pub from: String,
    pub to: String,
    pub people: Option<PeopleRef>,
    pub involvement: Option<Number>,
}

#[derive(Debug, Deserialize)]
pub struct RawPerson {
    pub id: String,
    pub name: String,
    pub order: Option<Number>,
}

/// A task's linked people: a single id or a list of ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PeopleRef {
    One(String),
    Many(Vec<String>),
}

impl PeopleRef {
    fn ids(&self) -> &[String] {
        match self {
            PeopleRef::One(id) => std::slice::from_ref(id),
            PeopleRef::Many(ids) => ids,
        }
    }
}

/// Numeric field that authors may write as a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Text(String),
}

impl Number {
    /// Integer value, or `default` when the text is not numeric.
    fn to_i32(&self, default: i32) -> i32 {
        match self {
            Number::Int(n) => *n as i32,
            Number::Text(s) => s.trim().parse().unwrap_or(default),
        }
    }
}

fn order_of(n: &Option<Number>) -> i32 {
    n.as_ref().map(|n| n.to_i32(0)).unwrap_or(0)
}

fn involvement_of(n: &Option<Number>) -> u8 {
    n.as_ref()
        .map(|n| n.to_i32(100).clamp(0, 100) as u8)
        .unwrap_or(100)
}

fn parse_date(value: &str, format: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| ParseError::InvalidDate {
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Build the model from a deserialized structured payload.
///
/// Every linked person id must resolve against the roster; an unresolved
/// id is fatal rather than a fallback trigger, since the payload already
/// validated as structured data.
pub fn build(
    raw: RawPayload,
    options: &GraphOptions,
    palette: &mut Palette,
) -> Result<TimelineModel, ParseError> {
    let format = options.date_format();
    let mut tasks = Vec::with_capacity(raw.tasks.len());
    let mut people = Vec::new();

    for entry in &raw.tasks {
        let group = entry.task_name.clone();
        let name = entry.sub_task_name.clone().unwrap_or_default();
        let color = entry.color.unwrap_or_else(|| palette.color_for(&group));
        let order = order_of(&entry.order);
        let from = day_start(parse_date(&entry.from, format)?);
        let to = day_end(parse_date(&entry.to, format)?);

        if let Some(linked) = &entry.people {
            let display_name = if name.is_empty() {
                group.clone()
            } else {
                format!("{} — {}", group, name)
            };
            for id in linked.ids() {
                let roster = raw
                    .people
                    .iter()
                    .find(|p| &p.id == id)
                    .ok_or_else(|| ParseError::UnknownPerson {
                        task: group.clone(),
                        id: id.clone(),
                    })?;
                people.push(Person {
                    person_group: roster.name.clone(),
                    order: order_of(&roster.order),
                    from,
                    to,
                    display_name: display_name.clone(),
                    task_group: group.clone(),
                    task_order: order,
                    color,
                    involvement: involvement_of(&entry.involvement),
                    url: None,
                    owning_task: Some(tasks.len()),
                });
            }
        }

        tasks.push(Task {
            group,
            name,
            style: entry.style.unwrap_or_default(),
            color,
            order,
            from,
            to,
            url: None,
            commit: None,
            previous_task: None,
        });
    }

    Ok(TimelineModel::new(tasks, people))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(text: &str) -> Result<TimelineModel, ParseError> {
        let raw: RawPayload = serde_json::from_str(text).unwrap();
        build(raw, &GraphOptions::default(), &mut Palette::new())
    }

    #[test]
    fn end_date_is_bumped_to_day_end() {
        let model = parse(
            r#"{"tasks":[{"taskName":"Alpha","from":"2024-01-01","to":"2024-01-03"}]}"#,
        )
        .unwrap();
        let task = &model.tasks[0];
        assert_eq!(
            task.to,
            NaiveDate::from_ymd_opt(2024, 1, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(task.to - task.from >= chrono::Duration::days(1));
    }

    #[test]
    fn linked_people_fan_out() {
        let model = parse(
            r#"{
              "tasks": [{
                "taskName": "Alpha", "subTaskName": "Kickoff",
                "from": "2024-01-01", "to": "2024-01-05",
                "people": ["p1", "p2"], "involvement": 50
              }],
              "people": [
                {"id": "p1", "name": "Ann", "order": 2},
                {"id": "p2", "name": "Bob"}
              ]
            }"#,
        )
        .unwrap();

        assert_eq!(model.people.len(), 2);
        let (ann, bob) = (&model.people[0], &model.people[1]);
        assert_eq!(ann.person_group, "Ann");
        assert_eq!(bob.person_group, "Bob");
        assert_eq!(ann.order, 2);
        assert_eq!(bob.order, 0);
        for p in &model.people {
            assert_eq!(p.from, model.tasks[0].from);
            assert_eq!(p.to, model.tasks[0].to);
            assert_eq!(p.task_group, "Alpha");
            assert_eq!(p.task_order, model.tasks[0].order);
            assert_eq!(p.display_name, "Alpha — Kickoff");
            assert_eq!(p.involvement, 50);
            assert_eq!(p.owning_task, Some(0));
        }
    }

    #[test]
    fn single_person_id_is_accepted() {
        let model = parse(
            r#"{
              "tasks": [{"taskName": "Alpha", "from": "2024-01-01",
                         "to": "2024-01-02", "people": "p1"}],
              "people": [{"id": "p1", "name": "Ann"}]
            }"#,
        )
        .unwrap();
        assert_eq!(model.people.len(), 1);
        assert_eq!(model.people[0].display_name, "Alpha");
    }

    #[test]
    fn unresolved_person_id_is_fatal() {
        let err = parse(
            r#"{"tasks":[{"taskName":"Alpha","from":"2024-01-01",
                "to":"2024-01-02","people":["ghost"]}],"people":[]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnknownPerson { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn non_numeric_order_defaults_to_zero() {
        let model = parse(
            r#"{"tasks":[{"taskName":"Alpha","order":"soon",
                "from":"2024-01-01","to":"2024-01-02"}]}"#,
        )
        .unwrap();
        assert_eq!(model.tasks[0].order, 0);
    }

    #[test]
    fn bad_date_is_fatal() {
        let err = parse(
            r#"{"tasks":[{"taskName":"Alpha","from":"01/02/2024","to":"2024-01-02"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn explicit_color_overrides_palette() {
        let model = parse(
            r##"{"tasks":[{"taskName":"Alpha","color":"#336699",
                "from":"2024-01-01","to":"2024-01-02"}]}"##,
        )
        .unwrap();
        assert_eq!(model.tasks[0].color, Color::from_rgb(0x33, 0x66, 0x99));
    }
}
