//! Integration tests for br-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, SNAPSHOT_FILE, SUMMARY_FILE};
    use crate::row::{BrainSnapshotRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap_row(agent_id: u32, tick: u64) -> BrainSnapshotRow {
        BrainSnapshotRow {
            agent_id,
            tick,
            activity: "idle".into(),
            running:  vec!["walk_to_target".into(), "look_at_target".into()],
            memories: vec!["home", "walk_target"],
        }
    }

    fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow { tick, day_time: tick + 100, brains_ticked: 2, running_behaviors: 5, commands: 3 }
    }

    fn records(path: std::path::PathBuf) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(SNAPSHOT_FILE).exists());
        assert!(dir.path().join(SUMMARY_FILE).exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["agent_id", "tick", "activity", "running", "memories"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, ["tick", "day_time", "brains_ticked", "running_behaviors", "commands"]);
    }

    #[test]
    fn snapshot_lists_joined() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(3, 5)]).unwrap();
        w.finish().unwrap();

        let rows = records(dir.path().join(SNAPSHOT_FILE));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][2], "idle");
        assert_eq!(&rows[0][3], "walk_to_target;look_at_target");
        assert_eq!(&rows[0][4], "home;walk_target");
        assert_eq!(&rows[1][0], "3");
    }

    #[test]
    fn tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(7)).unwrap();
        w.finish().unwrap();

        let rows = records(dir.path().join(SUMMARY_FILE));
        assert_eq!(rows.len(), 1);
        let fields: Vec<&str> = rows[0].iter().collect();
        assert_eq!(fields, ["7", "107", "2", "5", "3"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use br_core::{SimConfig, Vec3};
    use br_sim::{SimBuilder, SimObserver, TickSummary};
    use br_tasks::archetype;
    use br_world::{EntityKind, FlatWorld};

    use crate::csv::{CsvWriter, SNAPSHOT_FILE, SUMMARY_FILE};
    use crate::row::{BrainSnapshotRow, TickSummaryRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult, TraceObserver};

    /// Fails every write.
    struct Broken {
        writes: usize,
    }

    impl OutputWriter for Broken {
        fn write_snapshots(&mut self, _rows: &[BrainSnapshotRow]) -> OutputResult<()> {
            self.writes += 1;
            Err(OutputError::Io(std::io::Error::other(format!("write {}", self.writes))))
        }

        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.writes += 1;
            Err(OutputError::Io(std::io::Error::other(format!("write {}", self.writes))))
        }

        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_kept() {
        let mut obs = TraceObserver::new(Broken { writes: 0 });
        obs.on_tick_end(br_core::Tick(0), &TickSummary::default());
        obs.on_tick_end(br_core::Tick(1), &TickSummary::default());
        let err = obs.take_error().expect("error stored");
        assert!(err.to_string().contains("write 1"));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().writes, 2);
    }

    #[test]
    fn integration_csv() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let mut world = FlatWorld::new(1);
        let cow = world.spawn(EntityKind::Cow, Vec3::new(0.5, 64.0, 0.5));
        world.spawn(EntityKind::Player, Vec3::new(20.5, 64.0, 0.5));
        let a = archetype::cow().unwrap();
        let config = SimConfig {
            total_ticks:           30,
            seed:                  9,
            day_length_ticks:      24_000,
            start_day_time:        0,
            output_interval_ticks: 10,
        };
        let mut sim = SimBuilder::new(config, world).brain(cow, a.layout, a.brain).build().unwrap();

        let mut obs = TraceObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        // Only the cow has a brain: one row per snapshot tick.
        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        let ticks: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
        assert_eq!(ticks, ["0", "10", "20"]);
        assert!(rows.iter().all(|r| &r[0] == "0" && &r[2] == "idle"));

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let summaries: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(summaries.len(), 30);
        assert!(summaries.iter().all(|r| &r[2] == "1"));
    }
}
