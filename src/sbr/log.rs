// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Optional newline-delimited JSON log of traced rays.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

/// A per-primary-ray summary, produced by the tracer on request.
#[derive(Clone, Copy, Debug, Serialize)]
pub(crate) struct RayRecord {
    pub origin: [f64; 3],
    pub direction: [f64; 3],
    pub reflections: u32,
}

#[derive(Serialize)]
struct LogLine<'a> {
    t: f64,
    frame: usize,
    tx: usize,
    pulse: usize,
    sample: usize,
    #[serde(flatten)]
    record: &'a RayRecord,
}

/// Writes one JSON line per traced ray. The writer is mutex-guarded; the only
/// contention is between snapshots, never inside the hot loop.
pub(crate) struct RayLogger {
    writer: Mutex<BufWriter<File>>,
}

impl RayLogger {
    pub(crate) fn create(path: &Path) -> std::io::Result<RayLogger> {
        Ok(RayLogger {
            writer: Mutex::new(BufWriter::new(File::create(path)?)),
        })
    }

    pub(crate) fn log_snapshot(
        &self,
        t: f64,
        frame: usize,
        tx: usize,
        pulse: usize,
        sample: usize,
        records: &[RayRecord],
    ) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        for record in records {
            let line = LogLine {
                t,
                frame,
                tx,
                pulse,
                sample,
                record,
            };
            serde_json::to_writer(&mut *writer, &line)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> std::io::Result<()> {
        self.writer
            .into_inner()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "poisoned ray log"))?
            .flush()
    }
}
