//! Nutrient advice: a static per-week rule table, optionally replaced by an
//! OpenAI-compatible chat-completions model.

use crate::actions;
use crate::dates::Projection;
use crate::error::{HarvestError, Result};
use crate::records;
use crate::store::Store;
use crate::types::Program;
use crate::workers;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Rows in each program table. Weeks past the end reuse the last row.
pub const TABLE_WEEKS: u32 = 10;

const ATHENA: [&str; TABLE_WEEKS as usize] = [
    "Transplant support, low EC 1.6–1.8, silica light, no heavy PK.",
    "Stretch week: Bloom A/B at EC 2.0–2.2, keep Cleanse in rotation.",
    "Late stretch: EC 2.4, add CaMg if new growth pales, runoff 10%.",
    "Bulk onset: EC 2.6–2.8, begin Fade-free bloom ratio, steady dryback.",
    "Peak bulk: EC 2.8–3.0, hold pH 5.8–6.0, watch for tip burn.",
    "Bulk: EC 2.8, maintain Balance for pH, increase dryback slightly.",
    "Ripening: EC 2.4–2.6, reduce nitrogen, keep PK steady.",
    "Late ripening: EC 2.0–2.2, begin taper, monitor trichomes.",
    "Fade: drop to Fade only, EC 1.2–1.4, prepare for flush.",
    "Flush or water only, EC under 0.5 runoff, harvest window.",
];

const RAW_NPK: [&str; TABLE_WEEKS as usize] = [
    "Transplant: CaNO3 2 g/gal, MgSO4 1 g/gal, EC 1.4–1.6, no KH2PO4 yet.",
    "Stretch: CaNO3 3 g/gal, KNO3 1 g/gal, MgSO4 1.5 g/gal, EC 1.8–2.0.",
    "Late stretch: add KH2PO4 0.5 g/gal, EC 2.0–2.2, keep Ca strong.",
    "Bulk onset: KH2PO4 1 g/gal, KNO3 1.5 g/gal, EC 2.2–2.4.",
    "Peak bulk: KH2PO4 1.5 g/gal, cut CaNO3 to 2 g/gal, EC 2.4–2.6.",
    "Bulk: hold ratios, MgSO4 2 g/gal, pH 5.8–6.2, EC 2.4.",
    "Ripening: drop KNO3, KH2PO4 1 g/gal, EC 2.0–2.2.",
    "Late ripening: half-strength mix, EC 1.6–1.8, watch runoff EC.",
    "Taper: MgSO4 and KH2PO4 only, EC 1.0–1.2.",
    "Flush or water only, EC under 0.5 runoff, harvest window.",
];

const TIP_BURN: &str =
    "Tip burn noted: lower feed EC by 0.2–0.3 and check runoff EC before the next feed.";
const MAGNESIUM: &str =
    "Pale or yellow leaves: likely Mg deficiency, add MgSO4 0.5 g/gal or CaMg and verify pH.";
const LOCKOUT: &str =
    "Possible lockout: flush to 20% runoff and reset pH to 5.8–6.0 before feeding again.";

static KEYWORD_RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn keyword_rules() -> &'static [(Regex, &'static str)] {
    KEYWORD_RULES.get_or_init(|| {
        vec![
            (Regex::new(r"(?i)burn").unwrap(), TIP_BURN),
            (Regex::new(r"(?i)pale|yellow").unwrap(), MAGNESIUM),
            (Regex::new(r"(?i)lockout").unwrap(), LOCKOUT),
        ]
    })
}

fn table(program: Program) -> &'static [&'static str; TABLE_WEEKS as usize] {
    match program {
        Program::Athena => &ATHENA,
        Program::RawNpk => &RAW_NPK,
    }
}

/// Rule-table advice for `week` (clamped to 1..=10) with keyword
/// annotations from `notes`, one per line.
pub fn lookup(program: Program, week: i64, notes: &str) -> String {
    let idx = week.clamp(1, TABLE_WEEKS as i64) as usize - 1;
    let mut out = table(program)[idx].to_string();
    for (re, line) in keyword_rules() {
        if re.is_match(notes) {
            out.push('\n');
            out.push_str(line);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Requests and backends
// ---------------------------------------------------------------------------

/// Everything the advisor knows about one room.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdviceRequest {
    pub program: Program,
    pub week: u32,
    pub room: String,
    pub strain: String,
    pub plants: i64,
    pub lights: Option<String>,
    pub tank: Option<String>,
    pub grower: Option<String>,
    pub notes: String,
}

pub fn build_prompt(req: &AdviceRequest) -> String {
    let unknown = "unknown";
    let mut prompt = format!(
        "You are a cannabis cultivation expert using the {program}.\n\
         The room is overseen by grower '{grower}'.\n\
         Recommend nutrient mixing instructions (use ml/gal for liquids or g/gal for salts), \
         target EC and PPM,\n\
         for strain '{strain}' in week {week} of flower.\n\
         Room {room} has {plants} plants, {lights} lights, and a {tank} gal nutrient tank.\n",
        program = req.program.description(),
        grower = req.grower.as_deref().unwrap_or("Unassigned"),
        strain = req.strain,
        week = req.week,
        room = req.room,
        plants = req.plants,
        lights = req.lights.as_deref().unwrap_or(unknown),
        tank = req.tank.as_deref().unwrap_or(unknown),
    );
    if !req.notes.trim().is_empty() {
        prompt.push_str(&format!("Grower notes: {}\n", req.notes.trim()));
    }
    prompt.push_str("Return a concise step list and include both English and Simplified Chinese.");
    prompt
}

pub trait AdviceBackend: Send + Sync {
    fn advise(&self, req: &AdviceRequest) -> Result<String>;
}

/// The static table. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTable;

impl AdviceBackend for RuleTable {
    fn advise(&self, req: &AdviceRequest) -> Result<String> {
        Ok(lookup(req.program, i64::from(req.week), &req.notes))
    }
}

/// OpenAI-compatible `POST {base_url}/chat/completions` client.
pub struct ChatCompletions {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletions {
    pub fn new(base_url: &str, api_key: &str, model: &str, temperature: f32) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| HarvestError::Advice(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

impl AdviceBackend for ChatCompletions {
    fn advise(&self, req: &AdviceRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": build_prompt(req) }],
            "temperature": self.temperature,
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| HarvestError::Advice(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(HarvestError::Advice(format!("HTTP {status}: {text}")));
        }
        let value: serde_json::Value = resp
            .json()
            .map_err(|e| HarvestError::Advice(e.to_string()))?;
        value
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| HarvestError::Advice("response has no message content".into()))
    }
}

// ---------------------------------------------------------------------------
// Advising
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Table,
    Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub text: String,
    pub source: AdviceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
}

/// Ask `model` when one is configured, falling back to the rule table.
/// A failing model is reported in `model_error`, never as an error.
pub fn advise(req: &AdviceRequest, model: Option<&dyn AdviceBackend>) -> Advice {
    let table = || lookup(req.program, i64::from(req.week), &req.notes);
    match model {
        None => Advice {
            text: table(),
            source: AdviceSource::Table,
            model_error: None,
        },
        Some(backend) => match backend.advise(req) {
            Ok(text) => Advice {
                text,
                source: AdviceSource::Model,
                model_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, room = %req.room, "advice model failed, using table");
                Advice {
                    text: table(),
                    source: AdviceSource::Table,
                    model_error: Some(e.to_string()),
                }
            }
        },
    }
}

/// Operator input when running the advisor for a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunAdvice {
    pub record_id: i64,
    #[serde(default)]
    pub program: Option<String>,
    /// Table week to advise for instead of the projected one; clamped to
    /// `1..=TABLE_WEEKS`.
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub tank: Option<String>,
    #[serde(default)]
    pub lights: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdviceReport {
    pub record_id: i64,
    pub room: String,
    pub strain: String,
    pub week: u32,
    pub program: Program,
    pub grower: Option<String>,
    #[serde(flatten)]
    pub advice: Advice,
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Run the advisor for one record: project its week (unless overridden),
/// look up the room's grower, record a `Run Advisor` action and produce
/// advice.
pub fn run_for_record(
    store: &Store,
    input: &RunAdvice,
    default_program: Program,
    model: Option<&dyn AdviceBackend>,
    today: NaiveDate,
) -> Result<AdviceReport> {
    let program = match non_blank(&input.program) {
        Some(p) => p.parse()?,
        None => default_program,
    };
    let record = records::get(store, input.record_id)?;
    let week = match input.week {
        Some(w) => w.clamp(1, i64::from(TABLE_WEEKS)) as u32,
        None => Projection::from_str_date(&record.flower_date, today).week,
    };
    let grower = workers::assigned_worker(store, &record.room)?;
    let req = AdviceRequest {
        program,
        week,
        room: record.room.clone(),
        strain: record.strain.clone(),
        plants: record.plants,
        lights: non_blank(&input.lights),
        tank: non_blank(&input.tank),
        grower: grower.clone(),
        notes: input.notes.clone().unwrap_or_default(),
    };
    actions::log_action(
        store,
        grower.as_deref().unwrap_or(""),
        actions::RUN_ADVISOR,
        &record.room,
        &serde_json::json!({
            "program": program.as_str(),
            "week": week,
            "tank": req.tank,
            "lights": req.lights,
        }),
    );
    let advice = advise(&req, model);
    Ok(AdviceReport {
        record_id: record.id,
        room: record.room,
        strain: record.strain,
        week,
        program,
        grower,
        advice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionFilter;
    use crate::dates::parse_date;
    use crate::records::NewRecord;

    #[test]
    fn athena_week_one() {
        assert_eq!(
            lookup(Program::Athena, 1, ""),
            "Transplant support, low EC 1.6–1.8, silica light, no heavy PK."
        );
    }

    #[test]
    fn week_is_clamped_to_table() {
        assert_eq!(lookup(Program::Athena, 11, ""), lookup(Program::Athena, 10, ""));
        assert_eq!(lookup(Program::RawNpk, 0, ""), lookup(Program::RawNpk, 1, ""));
        assert_eq!(lookup(Program::RawNpk, -4, ""), RAW_NPK[0]);
    }

    #[test]
    fn burn_keyword_is_case_insensitive() {
        let out = lookup(Program::Athena, 5, "Some BURN on the tips");
        assert!(out.ends_with(TIP_BURN));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn keyword_lines_follow_fixed_order() {
        let out = lookup(Program::RawNpk, 3, "lockout? leaves yellow, slight burn");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![RAW_NPK[2], TIP_BURN, MAGNESIUM, LOCKOUT]);
    }

    #[test]
    fn pale_and_yellow_add_one_line() {
        let out = lookup(Program::Athena, 2, "pale and yellow");
        assert_eq!(out.matches(MAGNESIUM).count(), 1);
    }

    fn request() -> AdviceRequest {
        AdviceRequest {
            program: Program::RawNpk,
            week: 4,
            room: "F2".into(),
            strain: "Gelato".into(),
            plants: 48,
            lights: Some("LED 1000W".into()),
            tank: None,
            grower: None,
            notes: String::new(),
        }
    }

    #[test]
    fn prompt_embeds_room_context() {
        let p = build_prompt(&request());
        assert!(p.contains("RAW NPK or salt-based formulation"));
        assert!(p.contains("grower 'Unassigned'"));
        assert!(p.contains("strain 'Gelato' in week 4"));
        assert!(p.contains("Room F2 has 48 plants, LED 1000W lights, and a unknown gal"));
        assert!(p.contains("Simplified Chinese"));
    }

    #[test]
    fn no_model_uses_table() {
        let advice = advise(&request(), None);
        assert_eq!(advice.source, AdviceSource::Table);
        assert_eq!(advice.text, RAW_NPK[3]);
        assert!(advice.model_error.is_none());
    }

    #[test]
    fn chat_completions_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" Mix 2 g/gal. "}}]}"#)
            .create();

        let backend = ChatCompletions::new(&server.url(), "sk-test", "gpt-4o-mini", 0.3).unwrap();
        let advice = advise(&request(), Some(&backend));
        mock.assert();
        assert_eq!(advice.source, AdviceSource::Model);
        assert_eq!(advice.text, "Mix 2 g/gal.");
    }

    #[test]
    fn chat_completions_failure_falls_back_inline() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key"}}"#)
            .create();

        let backend = ChatCompletions::new(&server.url(), "sk-bad", "gpt-4o-mini", 0.3).unwrap();
        let advice = advise(&request(), Some(&backend));
        assert_eq!(advice.source, AdviceSource::Table);
        assert_eq!(advice.text, RAW_NPK[3]);
        assert!(advice.model_error.unwrap().contains("401"));
    }

    #[test]
    fn run_for_record_logs_action() {
        let store = Store::open_in_memory().unwrap();
        workers::add_worker(&store, "Ana").unwrap();
        workers::assign(&store, "F1", "Ana").unwrap();
        let r = records::add(
            &store,
            &NewRecord {
                room: "F1".into(),
                plants: 30,
                strain: "Runtz".into(),
                flower_date: "2024-04-01".into(),
            },
        )
        .unwrap();

        let report = run_for_record(
            &store,
            &RunAdvice {
                record_id: r.id,
                tank: Some("100".into()),
                notes: Some("yellowing".into()),
                ..Default::default()
            },
            Program::Athena,
            None,
            parse_date("2024-04-10").unwrap(),
        )
        .unwrap();
        assert_eq!(report.week, 2);
        assert_eq!(report.grower.as_deref(), Some("Ana"));
        assert!(report.advice.text.starts_with(ATHENA[1]));
        assert!(report.advice.text.contains(MAGNESIUM));

        let log = actions::list(
            &store,
            &ActionFilter {
                action: Some(actions::RUN_ADVISOR.into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].worker, "Ana");
        let details: serde_json::Value = serde_json::from_str(&log[0].details).unwrap();
        assert_eq!(details["program"], "athena");
        assert_eq!(details["tank"], "100");
    }

    #[test]
    fn run_for_record_rejects_unknown_program() {
        let store = Store::open_in_memory().unwrap();
        let err = run_for_record(
            &store,
            &RunAdvice {
                record_id: 1,
                program: Some("jacks".into()),
                ..Default::default()
            },
            Program::Athena,
            None,
            parse_date("2024-04-10").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidProgram(_)));
    }

    #[test]
    fn week_override_reaches_past_the_flowering_cycle() {
        let store = Store::open_in_memory().unwrap();
        let r = records::add(
            &store,
            &NewRecord {
                room: "F2".into(),
                plants: 12,
                strain: "Gelato".into(),
                flower_date: "2024-01-01".into(),
            },
        )
        .unwrap();
        let run = |week| {
            run_for_record(
                &store,
                &RunAdvice {
                    record_id: r.id,
                    week,
                    ..Default::default()
                },
                Program::RawNpk,
                None,
                parse_date("2024-06-01").unwrap(),
            )
            .unwrap()
        };

        let projected = run(None);
        assert_eq!(projected.week, 9);
        assert_eq!(projected.advice.text, RAW_NPK[8]);

        let last = run(Some(11));
        assert_eq!(last.week, 10);
        assert_eq!(last.advice.text, RAW_NPK[9]);

        assert_eq!(run(Some(-3)).week, 1);
    }
}
