use std::borrow::Borrow;
use std::collections::BTreeSet;

use super::model::{LeadTime, LeadTimeUnit, Record};

// ---------------------------------------------------------------------------
// Row selectors
// ---------------------------------------------------------------------------
//
// Every selector borrows its input and returns the surviving rows in their
// original relative order. Selectors compose: the output of one is a valid
// input for the next.

/// Keep rows whose model is in `models`.
///
/// An empty `models` set selects nothing (not "everything").
pub fn filter_by_models<'a, R, S>(records: &'a [R], models: &[S]) -> Vec<&'a Record>
where
    R: Borrow<Record>,
    S: AsRef<str>,
{
    let wanted: BTreeSet<&str> = models.iter().map(AsRef::as_ref).collect();
    if wanted.is_empty() {
        return Vec::new();
    }
    select(records, |r| wanted.contains(r.model.as_str()))
}

/// Keep rows for a single channel.
pub fn filter_by_channel<'a, R: Borrow<Record>>(records: &'a [R], channel: &str) -> Vec<&'a Record> {
    select(records, |r| r.channel == channel)
}

/// [`filter_by_channel`], paired with each row's position in `records`.
pub fn filter_by_channel_indexed<'a, R: Borrow<Record>>(
    records: &'a [R],
    channel: &str,
) -> Vec<(usize, &'a Record)> {
    records
        .iter()
        .map(Borrow::<Record>::borrow)
        .enumerate()
        .filter(|(_, r)| r.channel == channel)
        .collect()
}

/// Keep rows whose channel is in the allow-list.
pub fn filter_by_channels<'a, R, S>(records: &'a [R], channels: &[S]) -> Vec<&'a Record>
where
    R: Borrow<Record>,
    S: AsRef<str>,
{
    let wanted: BTreeSet<&str> = channels.iter().map(AsRef::as_ref).collect();
    select(records, |r| wanted.contains(r.channel.as_str()))
}

/// Keep rows whose lead time, converted from hours into `unit`, is exactly
/// one of `allowed` (which is expressed in `unit`).
pub fn filter_by_lead_times<'a, R: Borrow<Record>>(
    records: &'a [R],
    allowed: &[f64],
    unit: LeadTimeUnit,
) -> Vec<&'a Record> {
    let wanted: BTreeSet<LeadTime> = allowed.iter().copied().map(LeadTime::new).collect();
    select(records, |r| {
        wanted.contains(&LeadTime::new(unit.convert(r.lead_time)))
    })
}

fn select<'a, R, F>(records: &'a [R], mut keep: F) -> Vec<&'a Record>
where
    R: Borrow<Record>,
    F: FnMut(&Record) -> bool,
{
    records
        .iter()
        .map(|r| r.borrow())
        .filter(|r| keep(r))
        .collect()
}
