//! Timed interruptions for a terminal run
//!
//! `--pause-at SECS:FOR` and `--retarget AT:VALUE` are turned into a list of
//! actions sorted by time, handed out as the run clock passes them.

use std::str::FromStr;

/// Pause at `at_secs` and resume `for_secs` later
#[derive(Clone, Debug, PartialEq)]
pub struct PauseAt {
    pub at_secs: f64,
    pub for_secs: f64,
}

/// Switch to a new target at `at_secs`
#[derive(Clone, Debug, PartialEq)]
pub struct RetargetAt {
    pub at_secs: f64,
    pub value: String,
}

fn split_pair(s: &str) -> Result<(f64, &str), String> {
    let (at, rest) = s
        .split_once(':')
        .ok_or_else(|| format!("expected AT:VALUE, got '{s}'"))?;
    let at: f64 = at
        .trim()
        .parse()
        .map_err(|_| format!("invalid time '{at}' in '{s}'"))?;
    if !at.is_finite() || at < 0.0 {
        return Err(format!("time must be a non-negative number of seconds: '{s}'"));
    }
    Ok((at, rest.trim()))
}

impl FromStr for PauseAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at_secs, length) = split_pair(s)?;
        let for_secs: f64 = length
            .parse()
            .map_err(|_| format!("invalid pause length '{length}' in '{s}'"))?;
        if !for_secs.is_finite() || for_secs < 0.0 {
            return Err(format!("pause length must be non-negative: '{s}'"));
        }
        Ok(Self { at_secs, for_secs })
    }
}

impl FromStr for RetargetAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at_secs, value) = split_pair(s)?;
        if value.is_empty() {
            return Err(format!("missing target value in '{s}'"));
        }
        Ok(Self {
            at_secs,
            value: value.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Pause,
    Resume,
    Retarget(String),
}

/// Pending actions in firing order
#[derive(Debug, Default)]
pub struct Script {
    actions: Vec<(f64, Action)>,
    next: usize,
}

impl Script {
    pub fn new(pauses: &[PauseAt], retargets: &[RetargetAt]) -> Self {
        let mut actions = Vec::with_capacity(pauses.len() * 2 + retargets.len());
        for pause in pauses {
            let at_ms = pause.at_secs * 1000.0;
            actions.push((at_ms, Action::Pause));
            actions.push((at_ms + pause.for_secs * 1000.0, Action::Resume));
        }
        for retarget in retargets {
            actions.push((retarget.at_secs * 1000.0, Action::Retarget(retarget.value.clone())));
        }
        // Stable: simultaneous actions keep their command-line order
        actions.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { actions, next: 0 }
    }

    /// Actions whose time has come by `now_ms`
    pub fn due(&mut self, now_ms: f64) -> Vec<Action> {
        let start = self.next;
        while self.next < self.actions.len() && self.actions[self.next].0 <= now_ms {
            self.next += 1;
        }
        self.actions[start..self.next]
            .iter()
            .map(|(_, action)| action.clone())
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.actions.len()
    }
}
