//! Unit tests for the identifier newtypes

use core_kernel::{
    FeePaymentId, FeeStructureId, FeeTransactionId, GradeId, InvoiceId, LearnerId, StreamId,
};
use std::collections::HashSet;
use uuid::Uuid;

mod learner_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(LearnerId::new(), LearnerId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = LearnerId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = LearnerId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = LearnerId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("LRN-not-a-uuid".parse::<LearnerId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = LearnerId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: LearnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

mod prefixes {
    use super::*;

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes: HashSet<&str> = [
            LearnerId::prefix(),
            GradeId::prefix(),
            StreamId::prefix(),
            FeeStructureId::prefix(),
            FeePaymentId::prefix(),
            FeeTransactionId::prefix(),
            InvoiceId::prefix(),
        ]
        .into_iter()
        .collect();

        assert_eq!(prefixes.len(), 7);
    }

    #[test]
    fn test_display_uses_prefix() {
        assert!(GradeId::new().to_string().starts_with("GRD-"));
        assert!(FeeStructureId::new().to_string().starts_with("FST-"));
        assert!(InvoiceId::new().to_string().starts_with("INV-"));
    }

    #[test]
    fn test_foreign_prefix_is_not_stripped() {
        let uuid = Uuid::new_v4();
        assert!(format!("GRD-{}", uuid).parse::<InvoiceId>().is_err());
    }
}
