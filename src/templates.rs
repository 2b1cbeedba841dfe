use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use failure::{format_err, ResultExt};
use itertools::Itertools;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::errors::*;
use crate::utils::{ActionId, SlotName};

const DONTCARE_VALUE: &str = "dontcare";

lazy_static! {
    static ref SLOT_PLACEHOLDER_REGEX: Regex = Regex::new(r"#(\w+)").unwrap();
}

/// Response template bound to a dialog act
///
/// Slot placeholders are written `#slot_name`. An optional second text is used
/// whenever one of the template slots has the value "dontcare".
#[derive(Debug, Clone)]
pub struct Template {
    act: String,
    text: String,
    dontcare_text: Option<String>,
    slots: Vec<SlotName>,
    /// compiled text patterns along with their number of literal characters
    patterns: Vec<(Regex, usize)>,
}

impl Template {
    pub fn new<S: Into<String>>(
        act: S,
        text: S,
        dontcare_text: Option<String>,
    ) -> Result<Self> {
        let text = text.into();
        let slots = extract_slots(&text);
        let patterns = std::iter::once(&text)
            .chain(dontcare_text.iter())
            .map(|t| Ok((compile_pattern(t)?, literal_len(t))))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            act: act.into(),
            text,
            dontcare_text,
            slots,
            patterns,
        })
    }

    pub fn act(&self) -> &str {
        &self.act
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slots(&self) -> &[SlotName] {
        &self.slots
    }

    pub fn generate_text(&self, slot_values: &HashMap<String, String>) -> String {
        let use_dontcare = self.slots.iter().any(|slot| {
            slot_values
                .get(slot)
                .map(|value| value == DONTCARE_VALUE)
                .unwrap_or(false)
        });
        let text = match (use_dontcare, self.dontcare_text.as_ref()) {
            (true, Some(dontcare_text)) => dontcare_text,
            _ => &self.text,
        };
        SLOT_PLACEHOLDER_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                slot_values.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }

    /// Number of literal characters of the most specific pattern matching the
    /// response, if any
    fn match_specificity(&self, response: &str) -> Option<usize> {
        self.patterns
            .iter()
            .filter(|(pattern, _)| pattern.is_match(response))
            .map(|(_, nb_literals)| *nb_literals)
            .max()
    }

    fn is_literally(&self, response: &str) -> bool {
        self.text == response
            || self
                .dontcare_text
                .as_ref()
                .map(|t| t == response)
                .unwrap_or(false)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn extract_slots(text: &str) -> Vec<SlotName> {
    SLOT_PLACEHOLDER_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .unique()
        .collect()
}

fn literal_len(text: &str) -> usize {
    SLOT_PLACEHOLDER_REGEX
        .replace_all(text, "")
        .chars()
        .count()
}

/// Builds a regex matching any rendering of the template text
fn compile_pattern(text: &str) -> Result<Regex> {
    let mut pattern = "^".to_string();
    let mut last_end = 0;
    for placeholder in SLOT_PLACEHOLDER_REGEX.find_iter(text) {
        pattern.push_str(&regex::escape(&text[last_end..placeholder.start()]));
        pattern.push_str("(.*?)");
        last_end = placeholder.end();
    }
    pattern.push_str(&regex::escape(&text[last_end..]));
    pattern.push('$');
    Ok(Regex::new(&pattern)
        .with_context(|_| format!("Cannot compile pattern of template '{}'", text))?)
}

/// Ordered set of templates, the position of a template is its action id
pub struct Templates {
    templates: Vec<Template>,
}

impl Templates {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let templates_file = File::open(path.as_ref()).with_context(|_| {
            format!("Cannot open templates file '{:?}'", path.as_ref())
        })?;
        let templates = Self::from_reader(templates_file)
            .with_context(|_| format!("Cannot read templates file '{:?}'", path.as_ref()))?;
        info!(
            "Using {} templates from {:?}",
            templates.len(),
            path.as_ref()
        );
        Ok(templates)
    }

    /// Reads tab separated lines `act<TAB>text[<TAB>dontcare_text]`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut templates = vec![];
        for record in csv_reader.records() {
            let elements = record?;
            let act = elements.get(0).map(|s| s.trim()).unwrap_or("");
            if act.is_empty() {
                continue;
            }
            let text = elements
                .get(1)
                .ok_or_else(|| format_err!("Missing text for template of act '{}'", act))?;
            let dontcare_text = elements
                .get(2)
                .map(|t| t.to_string())
                .filter(|t| !t.is_empty());
            templates.push(Template::new(act, text, dontcare_text)?);
        }
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, action_id: ActionId) -> Option<&Template> {
        self.templates.get(action_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn actions(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.act()).collect()
    }

    pub fn action_id_of(&self, response: &str, act: &str) -> Result<ActionId> {
        let candidates = self
            .templates
            .iter()
            .enumerate()
            .filter(|(_, template)| template.act == act)
            .collect_vec();
        let action_id = match candidates.len() {
            0 => None,
            1 => Some(candidates[0].0),
            _ => candidates
                .iter()
                .find(|(_, template)| template.is_literally(response))
                .map(|(action_id, _)| *action_id)
                .or_else(|| most_specific_match(&candidates, response)),
        };
        action_id.ok_or_else(|| {
            HcnError::TemplateNotFound {
                act: act.to_string(),
                response: response.to_string(),
            }
            .into()
        })
    }

    pub fn render(
        &self,
        action_id: ActionId,
        slot_values: &HashMap<String, String>,
    ) -> Result<String> {
        Ok(self
            .templates
            .get(action_id)
            .ok_or_else(|| HcnError::UnknownAction(action_id))?
            .generate_text(slot_values))
    }

    pub fn required_slots(&self, action_id: ActionId) -> &[SlotName] {
        self.templates
            .get(action_id)
            .map(|template| template.slots())
            .unwrap_or(&[])
    }
}

/// Among the templates matching the response, the one with the most literal
/// characters wins, ties going to the lowest action id
fn most_specific_match(
    candidates: &[(ActionId, &Template)],
    response: &str,
) -> Option<ActionId> {
    let mut best: Option<(ActionId, usize)> = None;
    for (action_id, template) in candidates {
        let nb_literals = match template.match_specificity(response) {
            Some(nb_literals) => nb_literals,
            None => continue,
        };
        match best {
            Some((_, best_literals)) if best_literals >= nb_literals => {}
            _ => best = Some((*action_id, nb_literals)),
        }
    }
    best.map(|(action_id, _)| action_id)
}
