use crate::models::{Entity, TaggingScheme};

const BEGINNING_PREFIX: &str = "B-";
const INSIDE_PREFIX: &str = "I-";
const LAST_PREFIX: &str = "L-";
const UNIT_PREFIX: &str = "U-";
pub const OUTSIDE: &str = "O";

/// Tags without a known prefix, such as padding, are read as outside tags
fn is_outside(tag: &str) -> bool {
    ![BEGINNING_PREFIX, INSIDE_PREFIX, LAST_PREFIX, UNIT_PREFIX]
        .iter()
        .any(|prefix| tag.starts_with(prefix))
}

fn tag_name_to_slot_name(tag: &str) -> &str {
    &tag[2..]
}

fn is_start_of_io_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    if is_outside(tags[i].as_ref()) {
        false
    } else if i == 0 {
        true
    } else {
        is_outside(tags[i - 1].as_ref())
    }
}

fn is_end_of_io_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    if is_outside(tags[i].as_ref()) {
        false
    } else if i + 1 == tags.len() {
        true
    } else {
        is_outside(tags[i + 1].as_ref())
    }
}

fn is_start_of_bio_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    let tag = tags[i].as_ref();
    if is_outside(tag) {
        false
    } else if i == 0 || tag.starts_with(BEGINNING_PREFIX) {
        true
    } else {
        is_outside(tags[i - 1].as_ref())
    }
}

fn is_end_of_bio_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    if is_outside(tags[i].as_ref()) {
        false
    } else if i + 1 == tags.len() {
        true
    } else {
        !tags[i + 1].as_ref().starts_with(INSIDE_PREFIX)
    }
}

fn is_start_of_bilou_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    let tag = tags[i].as_ref();
    if is_outside(tag) {
        false
    } else if i == 0 || tag.starts_with(BEGINNING_PREFIX) || tag.starts_with(UNIT_PREFIX) {
        true
    } else {
        let previous = tags[i - 1].as_ref();
        previous.starts_with(UNIT_PREFIX)
            || previous.starts_with(LAST_PREFIX)
            || is_outside(previous)
    }
}

fn is_end_of_bilou_slot<S: AsRef<str>>(tags: &[S], i: usize) -> bool {
    let tag = tags[i].as_ref();
    if is_outside(tag) {
        false
    } else if i + 1 == tags.len() || tag.starts_with(LAST_PREFIX) || tag.starts_with(UNIT_PREFIX)
    {
        true
    } else {
        let next = tags[i + 1].as_ref();
        is_outside(next) || next.starts_with(BEGINNING_PREFIX) || next.starts_with(UNIT_PREFIX)
    }
}

fn tags_to_slots<S1, S2, F1, F2>(
    tokens: &[S1],
    tags: &[S2],
    is_start_of_slot: F1,
    is_end_of_slot: F2,
) -> Vec<Entity>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    F1: Fn(&[S2], usize) -> bool,
    F2: Fn(&[S2], usize) -> bool,
{
    let mut entities = vec![];
    let mut current_slot_start = 0;
    for (i, tag) in tags.iter().enumerate().take(tokens.len()) {
        if is_start_of_slot(tags, i) {
            current_slot_start = i;
        }
        if is_end_of_slot(tags, i) {
            let value = tokens[current_slot_start..=i]
                .iter()
                .map(|token| token.as_ref())
                .collect::<Vec<_>>()
                .join(" ");
            entities.push(Entity::new(tag_name_to_slot_name(tag.as_ref()), value));
            current_slot_start = i;
        }
    }
    entities
}

/// Groups the tagged tokens of an utterance into entities, in order of
/// appearance
pub fn tags_to_entities<S1, S2>(
    tokens: &[S1],
    tags: &[S2],
    tagging_scheme: TaggingScheme,
) -> Vec<Entity>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    match tagging_scheme {
        TaggingScheme::IO => {
            tags_to_slots(tokens, tags, is_start_of_io_slot::<S2>, is_end_of_io_slot::<S2>)
        }
        TaggingScheme::BIO => {
            tags_to_slots(tokens, tags, is_start_of_bio_slot::<S2>, is_end_of_bio_slot::<S2>)
        }
        TaggingScheme::BILOU => {
            tags_to_slots(tokens, tags, is_start_of_bilou_slot::<S2>, is_end_of_bilou_slot::<S2>)
        }
    }
}
