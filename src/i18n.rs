//! Report text in English, French and Arabic.
//!
//! The table is built once per process. Languages missing a key fall back to
//! the English entry; unknown language codes fall back to English entirely.
//! Arabic is served to text surfaces only; PDF reports requested in Arabic
//! are set in English because the builtin PDF fonts carry no Arabic glyphs.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::models::enums::{str_enum, InvalidEnum};
use crate::models::RiskLevel;

str_enum!(Language {
    En => "en",
    Fr => "fr",
    Ar => "ar",
});

impl Language {
    /// Lenient lookup: "fr-FR" → French, anything unknown → English.
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        primary.parse().unwrap_or(Language::En)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    ReportTitle,
    AiSystemName,
    Disclaimer,
    PatientId,
    ReportId,
    DateGenerated,
    TableOfContents,
    PatientOverview,
    ClinicalAnalysis,
    RiskAssessment,
    Recommendations,
    Conclusion,
    MedicalDisclaimer,
    ConditionHeader,
    ProbabilityHeader,
    RiskLevelHeader,
    HighRisk,
    ModerateRisk,
    LowRisk,
    NoImmediateConcerns,
    ConsultDoctor,
    FollowUp,
    NotDiagnosis,
    ConsultProfessional,
    PatientName,
    DateOfAnalysis,
    AiModel,
    AnalysisType,
    TotalConditions,
    UrgentConsultation,
    ModerateEvaluation,
    ClinicalCorrelation,
    ConclusionEvaluated,
    ConclusionConditions,
    ConclusionFindings,
    ConclusionHigh,
    ConclusionModerate,
    ConclusionLow,
    ConclusionReview,
    DisclaimerInformational,
    DisclaimerNoSubstitute,
    DisclaimerSeekAdvice,
    DisclaimerNeverDisregard,
    DisclaimerEmergency,
}

use TextKey::*;

const EN: &[(TextKey, &str)] = &[
    (ReportTitle, "Medical Imaging Analysis Report"),
    (AiSystemName, "AI-Assisted Medical Imaging System"),
    (Disclaimer, "This report is AI-assisted and does not constitute a medical diagnosis. Please consult with a qualified healthcare professional."),
    (PatientId, "Patient ID"),
    (ReportId, "Report ID"),
    (DateGenerated, "Date Generated"),
    (TableOfContents, "Table of Contents"),
    (PatientOverview, "Patient Overview"),
    (ClinicalAnalysis, "Clinical Analysis"),
    (RiskAssessment, "Risk Assessment"),
    (Recommendations, "Recommendations"),
    (Conclusion, "Conclusion"),
    (MedicalDisclaimer, "Medical Disclaimer"),
    (ConditionHeader, "Condition"),
    (ProbabilityHeader, "Probability"),
    (RiskLevelHeader, "Risk Level"),
    (HighRisk, "High Risk"),
    (ModerateRisk, "Moderate Risk"),
    (LowRisk, "Low Risk"),
    (NoImmediateConcerns, "No immediate concerns detected. Continue routine monitoring."),
    (ConsultDoctor, "Consult with a qualified healthcare professional for proper evaluation."),
    (FollowUp, "Follow-up examination may be recommended based on clinical correlation."),
    (NotDiagnosis, "This report is generated using artificial intelligence and is for informational purposes only. It should not replace professional medical diagnosis, treatment, or advice."),
    (ConsultProfessional, "Always consult with a qualified healthcare provider for medical decisions."),
    (PatientName, "Patient Name"),
    (DateOfAnalysis, "Date of Analysis"),
    (AiModel, "AI Model"),
    (AnalysisType, "Analysis Type"),
    (TotalConditions, "Total Conditions Analyzed"),
    (UrgentConsultation, "Immediate consultation is recommended for high-risk findings."),
    (ModerateEvaluation, "Moderate-risk conditions may require additional evaluation."),
    (ClinicalCorrelation, "This analysis is based on imaging data and should be correlated with clinical findings and patient history."),
    (ConclusionEvaluated, "This analysis has evaluated"),
    (ConclusionConditions, "conditions based on the provided medical imaging."),
    (ConclusionFindings, "The findings indicate"),
    (ConclusionHigh, "high-risk,"),
    (ConclusionModerate, "moderate-risk, and"),
    (ConclusionLow, "low-risk conditions."),
    (ConclusionReview, "It is important to note that this analysis is AI-assisted and should be reviewed by a qualified healthcare professional in conjunction with clinical examination and patient history for comprehensive medical evaluation."),
    (DisclaimerInformational, "This report is generated using artificial intelligence technology and is intended for informational purposes only."),
    (DisclaimerNoSubstitute, "The analysis provided should not be used as a substitute for professional medical advice, diagnosis, or treatment."),
    (DisclaimerSeekAdvice, "Always seek the advice of qualified healthcare providers with any questions regarding a medical condition."),
    (DisclaimerNeverDisregard, "Never disregard professional medical advice or delay in seeking it because of information in this report."),
    (DisclaimerEmergency, "In case of a medical emergency, contact your local emergency services immediately."),
];

const FR: &[(TextKey, &str)] = &[
    (ReportTitle, "Rapport d'Analyse d'Imagerie Médicale"),
    (AiSystemName, "Système d'Imagerie Médicale Assisté par IA"),
    (Disclaimer, "Ce rapport est assisté par IA et ne constitue pas un diagnostic médical. Veuillez consulter un professionnel de la santé qualifié."),
    (PatientId, "ID Patient"),
    (ReportId, "ID Rapport"),
    (DateGenerated, "Date de Génération"),
    (TableOfContents, "Table des Matières"),
    (PatientOverview, "Aperçu du Patient"),
    (ClinicalAnalysis, "Analyse Clinique"),
    (RiskAssessment, "Évaluation des Risques"),
    (Recommendations, "Recommandations"),
    (Conclusion, "Conclusion"),
    (MedicalDisclaimer, "Avertissement Médical"),
    (ConditionHeader, "Condition"),
    (ProbabilityHeader, "Probabilité"),
    (RiskLevelHeader, "Niveau de Risque"),
    (HighRisk, "Risque Élevé"),
    (ModerateRisk, "Risque Modéré"),
    (LowRisk, "Risque Faible"),
    (NoImmediateConcerns, "Aucun problème immédiat détecté. Continuez la surveillance de routine."),
    (ConsultDoctor, "Consultez un professionnel de la santé qualifié pour une évaluation appropriée."),
    (FollowUp, "Un examen de suivi peut être recommandé en fonction de la corrélation clinique."),
    (NotDiagnosis, "Ce rapport est généré à l'aide de l'intelligence artificielle et est à des fins d'information uniquement. Il ne doit pas remplacer le diagnostic, le traitement ou les conseils médicaux professionnels."),
    (ConsultProfessional, "Consultez toujours un professionnel de la santé qualifié pour les décisions médicales."),
    (PatientName, "Nom du Patient"),
    (DateOfAnalysis, "Date de l'Analyse"),
    (AiModel, "Modèle IA"),
    (AnalysisType, "Type d'Analyse"),
    (TotalConditions, "Nombre Total de Conditions Analysées"),
    (UrgentConsultation, "Une consultation immédiate est recommandée pour les résultats à risque élevé."),
    (ModerateEvaluation, "Les conditions à risque modéré peuvent nécessiter une évaluation complémentaire."),
    (ClinicalCorrelation, "Cette analyse repose sur des données d'imagerie et doit être corrélée aux résultats cliniques et aux antécédents du patient."),
    (ConclusionEvaluated, "Cette analyse a évalué"),
    (ConclusionConditions, "conditions à partir de l'imagerie médicale fournie."),
    (ConclusionFindings, "Les résultats indiquent"),
    (ConclusionHigh, "à risque élevé,"),
    (ConclusionModerate, "à risque modéré et"),
    (ConclusionLow, "à risque faible."),
    (ConclusionReview, "Il est important de noter que cette analyse est assistée par IA et doit être examinée par un professionnel de la santé qualifié, conjointement avec l'examen clinique et les antécédents du patient, pour une évaluation médicale complète."),
    (DisclaimerInformational, "Ce rapport est généré à l'aide d'une technologie d'intelligence artificielle et est destiné à des fins d'information uniquement."),
    (DisclaimerNoSubstitute, "L'analyse fournie ne doit pas remplacer un avis, un diagnostic ou un traitement médical professionnel."),
    (DisclaimerSeekAdvice, "Demandez toujours l'avis de professionnels de la santé qualifiés pour toute question concernant une condition médicale."),
    (DisclaimerNeverDisregard, "Ne négligez jamais un avis médical professionnel et ne tardez pas à le demander en raison des informations de ce rapport."),
    (DisclaimerEmergency, "En cas d'urgence médicale, contactez immédiatement les services d'urgence locaux."),
];

/// Partial table; report sections without an entry use English.
const AR: &[(TextKey, &str)] = &[
    (ReportTitle, "تقرير تحليل التصوير الطبي"),
    (AiSystemName, "نظام التصوير الطبي المدعوم بالذكاء الاصطناعي"),
    (Disclaimer, "هذا التقرير مدعوم بالذكاء الاصطناعي ولا يشكل تشخيصاً طبياً. يرجى استشارة أخصائي رعاية صحية مؤهل."),
    (PatientId, "رقم المريض"),
    (ReportId, "رقم التقرير"),
    (DateGenerated, "تاريخ الإنشاء"),
    (TableOfContents, "جدول المحتويات"),
    (PatientOverview, "نظرة عامة على المريض"),
    (ClinicalAnalysis, "التحليل السريري"),
    (RiskAssessment, "تقييم المخاطر"),
    (Recommendations, "التوصيات"),
    (Conclusion, "الخلاصة"),
    (MedicalDisclaimer, "إخلاء المسؤولية الطبية"),
    (ConditionHeader, "الحالة"),
    (ProbabilityHeader, "الاحتمالية"),
    (RiskLevelHeader, "مستوى المخاطر"),
    (HighRisk, "خطر عالي"),
    (ModerateRisk, "خطر متوسط"),
    (LowRisk, "خطر منخفض"),
    (NoImmediateConcerns, "لم يتم اكتشاف مخاوف فورية. استمر في المراقبة الروتينية."),
    (ConsultDoctor, "استشر أخصائي رعاية صحية مؤهل للتقييم المناسب."),
    (FollowUp, "قد يُنصح بإجراء فحص متابعة بناءً على الارتباط السريري."),
    (NotDiagnosis, "يتم إنشاء هذا التقرير باستخدام الذكاء الاصطناعي وهو لأغراض إعلامية فقط. لا ينبغي أن يحل محل التشخيص الطبي المهني أو العلاج أو المشورة."),
    (ConsultProfessional, "استشر دائماً مقدم رعاية صحية مؤهل لاتخاذ القرارات الطبية."),
];

static TRANSLATIONS: LazyLock<HashMap<Language, HashMap<TextKey, &'static str>>> =
    LazyLock::new(|| {
        [(Language::En, EN), (Language::Fr, FR), (Language::Ar, AR)]
            .into_iter()
            .map(|(lang, entries)| (lang, entries.iter().copied().collect()))
            .collect()
    });

/// Look up a string, falling back to English when the language lacks it.
pub fn text(lang: Language, key: TextKey) -> &'static str {
    TRANSLATIONS
        .get(&lang)
        .and_then(|table| table.get(&key))
        .or_else(|| TRANSLATIONS.get(&Language::En).and_then(|t| t.get(&key)))
        .copied()
        .unwrap_or_default()
}

/// Localized tier label ("High Risk", "Risque Élevé", ...).
pub fn risk_label(lang: Language, level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => text(lang, HighRisk),
        RiskLevel::Moderate => text(lang, ModerateRisk),
        RiskLevel::Low => text(lang, LowRisk),
    }
}
