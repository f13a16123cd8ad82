mod tests {
    use std::collections::VecDeque;
    use std::fs;

    use living_light::calibration::{load_or_calibrate, run_calibration};
    use living_light::sensor::DistanceReadings;
    use living_light::{CalibrationData, Depth, Error, KeySet, Lateral, Operator, Proximity, SensorAdapter};
    use tempfile::TempDir;

    /// Reports `10 * n` cm on the first channel for the n-th read
    #[derive(Default)]
    struct CountingSensors {
        reads: u16,
    }

    impl SensorAdapter for CountingSensors {
        fn read_distance(&mut self) -> DistanceReadings {
            self.reads += 1;
            DistanceReadings::from_slice(&[Some(f32::from(self.reads) * 10.0), None]).unwrap()
        }

        fn read_proximity(&mut self) -> Proximity {
            Proximity::default()
        }

        fn read_keys(&mut self) -> KeySet {
            KeySet::new()
        }
    }

    struct ScriptedOperator {
        answers: VecDeque<bool>,
        prompts: Vec<String>,
    }

    impl ScriptedOperator {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Operator for ScriptedOperator {
        fn confirm(&mut self, prompt: &str) -> bool {
            self.prompts.push(prompt.to_owned());
            self.answers.pop_front().unwrap_or(true)
        }

        fn pick_scenario(&mut self, _names: &[&str]) -> Option<String> {
            None
        }
    }

    fn sample() -> CalibrationData {
        CalibrationData::new(vec![Some(310.0), None])
            .with(Depth::Entrance, Lateral::Center, vec![Some(42.5), Some(40.0)])
            .with(Depth::Midway, Lateral::Center, vec![Some(101.0), Some(99.0)])
            .with(Depth::Exit, Lateral::Left, vec![None, Some(158.0)])
    }

    #[test]
    fn test_csv_has_one_row_per_step() {
        let csv = sample().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "310,");
        assert_eq!(lines[2], "42.5,40");
        assert_eq!(lines[1], "");
        assert_eq!(lines[9], ",158");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration_params.csv");

        let data = sample();
        data.save(&path).unwrap();
        let loaded = CalibrationData::load(&path).unwrap();

        assert_eq!(loaded.baseline, vec![Some(310.0), None]);
        assert_eq!(loaded.reading(Depth::Entrance, Lateral::Center, 0), Some(42.5));
        assert_eq!(loaded.reading(Depth::Midway, Lateral::Center, 1), Some(99.0));
        assert_eq!(loaded.reading(Depth::Exit, Lateral::Left, 0), None);
        assert_eq!(loaded.reading(Depth::Exit, Lateral::Left, 1), Some(158.0));
        assert_eq!(loaded.reading(Depth::Exit, Lateral::Right, 0), None);
        assert_eq!(loaded.channels(), 2);
    }

    #[test]
    fn test_parse_tolerates_garbage_fields() {
        let source = "300,abc\n\n\n\n\n\n\n\n\n1, 2 ,nan\n";
        let data = CalibrationData::parse(source).unwrap();
        assert_eq!(data.baseline, vec![Some(300.0), None]);
        assert_eq!(data.get(Depth::Exit, Lateral::Left), &[Some(1.0), Some(2.0), None]);
        assert_eq!(data.reading(Depth::Entrance, Lateral::Right, 0), None);
    }

    #[test]
    fn test_missing_or_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(matches!(
            CalibrationData::load(&path),
            Err(Error::CalibrationFileMissingOrCorrupt { .. })
        ));

        fs::write(&path, "1,2\n3,4\n").unwrap();
        assert!(matches!(
            CalibrationData::load(&path),
            Err(Error::CalibrationFileMissingOrCorrupt { .. })
        ));
    }

    #[test]
    fn test_procedure_records_every_confirmed_step() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration_params.csv");
        let mut sensors = CountingSensors::default();
        // Decline Entrance Left, accept the rest and save
        let mut answers = [true; 11];
        answers[3] = false;
        let mut operator = ScriptedOperator::new(&answers);

        let data = run_calibration(&mut sensors, &mut operator, &path).unwrap();

        assert_eq!(operator.prompts.len(), 11);
        assert!(operator.prompts[3].contains("Entrance Left"));
        assert_eq!(sensors.reads, 9);
        assert_eq!(data.baseline, vec![Some(10.0), None]);
        assert_eq!(data.reading(Depth::Entrance, Lateral::Right, 0), Some(20.0));
        assert_eq!(data.reading(Depth::Entrance, Lateral::Center, 0), Some(30.0));
        assert!(data.get(Depth::Entrance, Lateral::Left).is_empty());
        assert_eq!(data.reading(Depth::Midway, Lateral::Right, 0), Some(40.0));
        assert_eq!(data.reading(Depth::Exit, Lateral::Left, 0), Some(90.0));

        assert_eq!(CalibrationData::load(&path).unwrap(), data);
    }

    #[test]
    fn test_procedure_without_saving() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration_params.csv");
        let mut answers = [true; 11];
        answers[10] = false;
        let mut operator = ScriptedOperator::new(&answers);

        run_calibration(&mut CountingSensors::default(), &mut operator, &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_or_calibrate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration_params.csv");
        sample().save(&path).unwrap();

        let mut sensors = CountingSensors::default();
        let mut operator = ScriptedOperator::new(&[]);
        let loaded = load_or_calibrate(&path, false, &mut sensors, &mut operator).unwrap();
        assert_eq!(loaded.reading(Depth::Midway, Lateral::Center, 0), Some(101.0));
        assert!(operator.prompts.is_empty());

        let fresh = load_or_calibrate(&path, true, &mut sensors, &mut operator).unwrap();
        assert_eq!(sensors.reads, 10);
        assert_eq!(fresh.baseline, vec![Some(10.0), None]);

        fs::remove_file(&path).unwrap();
        load_or_calibrate(&path, false, &mut sensors, &mut operator).unwrap();
        assert_eq!(sensors.reads, 20);
        assert!(path.exists());
    }
}
