//! Integration Tests for the assessment pipeline
//!
//! Tests builder + audit + model + classifier khi kết hợp với nhau.

#[cfg(test)]
mod integration_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::logic::audit::{AuditSink, AuditWriteError, CsvAuditLog, MemoryAuditSink, NullAuditSink};
    use crate::logic::features::{
        builder::{RawAnswers, RecordBuilder},
        layout::{compute_names_hash, layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT},
        record::FeatureRecord,
        schema::{DietaryHabits, Profession, Status, SuicidalThoughts},
    };
    use crate::logic::flow::{AssessError, Assessor};
    use crate::logic::model::{
        inference::{load_model, ModelMetadata, PredictError, RiskModel},
        threshold::RiskTier,
    };

    /// Stub model that counts calls and checks the layout it was "trained" on
    struct CountingModel {
        probability: f64,
        calls: AtomicUsize,
        metadata: ModelMetadata,
    }

    impl CountingModel {
        fn new(probability: f64) -> Arc<Self> {
            Self::with_layout(probability, LayoutInfo::current())
        }

        fn with_layout(probability: f64, layout: LayoutInfo) -> Arc<Self> {
            Arc::new(Self {
                probability,
                calls: AtomicUsize::new(0),
                metadata: ModelMetadata::new("stub", "stub", &layout),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RiskModel for CountingModel {
        fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            record.validate_against(self.metadata.layout_hash)?;
            Ok(self.probability)
        }

        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }
    }

    /// Sink that always fails
    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn append(&self, _record: &FeatureRecord) -> Result<(), AuditWriteError> {
            Err(AuditWriteError::Io {
                path: "/dev/full".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    fn student_answers() -> RawAnswers {
        RawAnswers {
            age: 25,
            suicidal_thoughts: SuicidalThoughts::No,
            academic_work_pressure: 3,
            financial_stress: 3,
            academic_work_satisfaction: 3,
            status: Status::Student,
            cgpa_not_applicable: false,
            cgpa: 6.80,
            work_study_hours: 6,
            dietary_habits: DietaryHabits::Healthy,
            no_job: false,
            profession: Some(Profession::Teacher),
            sleep_duration: 7,
        }
    }

    /// Every answer lands in its layout column, in order
    #[test]
    fn test_student_record_encodes_all_fields() {
        let sink = Arc::new(MemoryAuditSink::new());
        let record = RecordBuilder::new(sink.clone()).build(&student_answers()).unwrap();

        let row = record.to_row();
        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(
            row,
            ["25", "No", "3", "3", "3", "Student", "6.80", "6", "Healthy", "Teacher", "7"]
        );
        assert_eq!(record.feature_names(), FEATURE_LAYOUT);
        assert_eq!(sink.len(), 1);
    }

    /// An out-of-range age stops before the model and the audit log
    #[test]
    fn test_invalid_age_skips_model() {
        let model = CountingModel::new(0.5);
        let sink = Arc::new(MemoryAuditSink::new());
        let assessor = Assessor::new(model.clone(), sink.clone());

        let err = assessor.assess(&RawAnswers { age: 5, ..student_answers() }).unwrap_err();
        match &err {
            AssessError::Validation(e) => assert_eq!(e.field(), "age"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(err.is_user_correctable());
        assert_eq!(model.calls(), 0);
        assert!(sink.is_empty());
    }

    /// A probability above the upper threshold classifies as High
    #[test]
    fn test_high_probability_is_high_tier() {
        let model = CountingModel::new(0.75);
        let assessor = Assessor::new(model.clone(), Arc::new(NullAuditSink));

        let assessment = assessor.assess(&student_answers()).unwrap();
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.percent(), "75.00%");
        assert_eq!(model.calls(), 1);
    }

    /// Ticking "no CGPA" sends the NaN sentinel even when the input reads 0.00
    #[test]
    fn test_inapplicable_cgpa_is_nan_not_zero() {
        let raw = RawAnswers {
            cgpa_not_applicable: true,
            cgpa: 0.0,
            ..student_answers()
        };
        let record = RecordBuilder::without_audit().build(&raw).unwrap();
        assert_eq!(record.to_row()[6], "NaN");
        assert_ne!(record.to_row()[6], "0.00");
    }

    #[test]
    fn test_audit_failure_does_not_fail_assessment() {
        let assessor = Assessor::new(CountingModel::new(0.2), Arc::new(BrokenSink));
        let assessment = assessor.assess(&student_answers()).unwrap();
        assert_eq!(assessment.tier, RiskTier::Low);
    }

    #[test]
    fn test_schema_mismatch_is_internal() {
        let mut names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        names[0] = "age".to_string();
        let layout = LayoutInfo::from_names(&names);
        assert_ne!(layout.hash, layout_hash());

        let assessor = Assessor::new(CountingModel::with_layout(0.9, layout), Arc::new(NullAuditSink));
        let err = assessor.assess(&student_answers()).unwrap_err();

        assert!(matches!(err, AssessError::Predict(PredictError::SchemaMismatch(_))));
        assert!(!err.is_user_correctable());
        assert_eq!(assessor.stats().prediction_failures, 1);
    }

    #[test]
    fn test_csv_audit_replays_what_was_assessed() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(CsvAuditLog::new(dir.path().join("input_data.csv")));
        let assessor = Assessor::new(CountingModel::new(0.4), log.clone());

        let variants = [
            student_answers(),
            RawAnswers { no_job: true, ..student_answers() },
            RawAnswers {
                status: Status::WorkingProfessional,
                cgpa_not_applicable: true,
                profession: Some(Profession::InvestmentBanker),
                ..student_answers()
            },
        ];
        for raw in &variants {
            assert_eq!(assessor.assess(raw).unwrap().tier, RiskTier::Moderate);
        }
        // Rejected answers are not audited
        assessor.assess(&RawAnswers { cgpa: 10.5, ..student_answers() }).unwrap_err();

        let replayed = log.read_records().unwrap();
        assert_eq!(replayed.len(), 3);
        assert_eq!(replayed[1].to_row()[9], "missing");
        assert_eq!(replayed[2].to_row()[6], "NaN");
        assert_eq!(replayed[2].to_row()[9], "Investment Banker");
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(CsvAuditLog::new(dir.path().join("input_data.csv")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                std::thread::spawn(move || {
                    let builder = RecordBuilder::new(log);
                    for j in 0..25 {
                        let raw = RawAnswers { age: 10 + i * 10 + j % 10, ..student_answers() };
                        builder.build(&raw).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1 + 8 * 25);
        assert_eq!(log.read_records().unwrap().len(), 8 * 25);
    }

    #[test]
    fn test_round_trip_numeric_fields() {
        for age in [10, 42, 100] {
            for cgpa in [0.0, 3.33, 7.0, 10.0] {
                let record = RecordBuilder::without_audit()
                    .build(&RawAnswers { age, cgpa, ..student_answers() })
                    .unwrap();
                let reparsed = FeatureRecord::from_row(&record.to_row()).unwrap();

                assert_eq!(reparsed, record);
                assert_eq!(i64::from(reparsed.age()), age);
                let cgpa_back: f64 = reparsed.to_row()[6].parse().unwrap();
                assert!((cgpa_back - cgpa).abs() < 0.005);
            }
        }
    }

    #[test]
    fn test_scorecard_artifact_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catboost_tuned_model.json");
        let artifact = serde_json::json!({
            "name": "depression-scorecard",
            "feature_names": FEATURE_LAYOUT,
            "intercept": -2.0,
            "terms": {
                "Have you ever had suicidal thoughts ?": {
                    "kind": "categorical", "levels": { "Yes": 3.0 }
                },
                "Financial Stress": { "kind": "numeric", "weight": 0.4 }
            }
        });
        std::fs::write(&path, serde_json::to_vec_pretty(&artifact).unwrap()).unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.metadata().layout_hash, compute_names_hash(FEATURE_LAYOUT.iter()));

        let assessor = Assessor::new(model, Arc::new(NullAuditSink));
        let calm = assessor.assess(&RawAnswers { financial_stress: 1, ..student_answers() }).unwrap();
        let risky = assessor
            .assess(&RawAnswers {
                suicidal_thoughts: SuicidalThoughts::Yes,
                financial_stress: 5,
                ..student_answers()
            })
            .unwrap();

        assert_eq!(calm.tier, RiskTier::Low);
        assert_eq!(risky.tier, RiskTier::High);

        // Deterministic
        let again = assessor
            .assess(&RawAnswers {
                suicidal_thoughts: SuicidalThoughts::Yes,
                financial_stress: 5,
                ..student_answers()
            })
            .unwrap();
        assert_eq!(again, risky);
    }
}
