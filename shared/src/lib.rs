pub mod grade;
pub mod wire;

pub use grade::{
    BadgeTone, ClinicalFlag, FindingLevel, GradeCoercion, GradeMetadata, GradeValue, KlGrade,
    SeverityTier,
};
pub use wire::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryResult, ClassificationResult, ContractError,
    PredictResponse,
};
