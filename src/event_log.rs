//! JSON lines log of every game event.
//!
//! One object per line: the serialized [`GameEvent`] (tagged by `"event"`)
//! with the episode id added, e.g.
//! `{"episode":0,"event":"swap_attempted","from":{"row":2,"col":2},"to":{"row":2,"col":3},"accepted":true}`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::types::GameEvent;

#[derive(Serialize)]
struct Line<'a> {
    episode: u32,
    #[serde(flatten)]
    event: &'a GameEvent,
}

pub struct EventLog<W: Write> {
    out: W,
    written: u64,
}

impl EventLog<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("create event log {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Lines written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn record(&mut self, episode: u32, events: &[GameEvent]) -> Result<()> {
        for event in events {
            serde_json::to_writer(&mut self.out, &Line { episode, event })
                .context("serialize game event")?;
            self.out.write_all(b"\n")?;
            self.written += 1;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("flush event log")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
