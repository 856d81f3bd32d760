//! Paginated PDF report.
//!
//! Section order is fixed: cover, table of contents, patient overview,
//! clinical analysis table, risk assessment, recommendations, conclusion,
//! medical disclaimer. [`compose`] produces the page model; [`render`] turns
//! it into PDF bytes via `printpdf`.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::*;

use super::layout::{
    max_chars_for, text_width, truncate_to, Align, DrawOp, Face, Page, PageLayout, Rgb8, Style,
    BG_LIGHT, BORDER, CONTENT_WIDTH, FOOTER_GRAY, FOOTER_SIZE, FOOTER_Y, MARGIN, PAGE_HEIGHT,
    PAGE_WIDTH, TEXT_DARK, TEXT_MEDIUM, WHITE,
};
use super::{ExportArtifact, ExportError, MIME_PDF};
use crate::i18n::{risk_label, text, Language, TextKey};
use crate::models::{sorted_by_percentage, NormalizedResult, ReportMetadata, RiskLevel};
use crate::risk::RiskSummary;

const CALLOUT_FILL: Rgb8 = Rgb8(255, 249, 237);
const CALLOUT_STROKE: Rgb8 = Rgb8(245, 158, 11);

const SECTION_TITLE: Style = Style::new(16.0, Face::Bold, TEXT_DARK);
const BODY: Style = Style::new(10.0, Face::Regular, TEXT_DARK);
const BODY_MEDIUM: Style = Style::new(10.0, Face::Regular, TEXT_MEDIUM);

const ROW_HEIGHT: f32 = 9.0;
const HEADER_HEIGHT: f32 = 10.0;
const COL_VALUE: f32 = MARGIN + CONTENT_WIDTH * 0.6;
const COL_RISK: f32 = MARGIN + CONTENT_WIDTH * 0.8;

/// Table of contents entries. Page numbers are fixed, not measured.
const TOC_ENTRIES: &[(TextKey, u32)] = &[
    (TextKey::PatientOverview, 3),
    (TextKey::ClinicalAnalysis, 3),
    (TextKey::RiskAssessment, 4),
    (TextKey::Recommendations, 4),
    (TextKey::Conclusion, 5),
    (TextKey::MedicalDisclaimer, 5),
];

const DISCLAIMER_LINES: &[TextKey] = &[
    TextKey::NotDiagnosis,
    TextKey::ConsultProfessional,
    TextKey::DisclaimerInformational,
    TextKey::DisclaimerNoSubstitute,
    TextKey::DisclaimerSeekAdvice,
    TextKey::DisclaimerNeverDisregard,
    TextKey::DisclaimerEmergency,
];

/// Strong (text/border) and light (fill) colors per tier.
pub fn risk_colors(level: RiskLevel) -> (Rgb8, Rgb8) {
    match level {
        RiskLevel::High => (Rgb8(220, 38, 38), Rgb8(254, 226, 226)),
        RiskLevel::Moderate => (Rgb8(217, 119, 6), Rgb8(254, 243, 199)),
        RiskLevel::Low => (Rgb8(5, 150, 105), Rgb8(209, 250, 229)),
    }
}

/// Builds the full PDF artifact.
///
/// Arabic falls back to English text: the builtin Helvetica faces only cover
/// WinAnsi.
pub fn export_pdf(
    results: &[NormalizedResult],
    metadata: &ReportMetadata,
    lang: Language,
) -> Result<ExportArtifact, ExportError> {
    let lang = pdf_language(lang);
    let pages = compose(results, metadata, lang);
    let bytes = render(&pages, text(lang, TextKey::ReportTitle), metadata)?;
    let filename = format!(
        "Medical-Report-{}-{}.pdf",
        metadata.patient_id,
        metadata.epoch_millis()
    );
    Ok(ExportArtifact::new(filename, MIME_PDF, bytes))
}

/// Language the PDF text is set in for a requested report language.
pub fn pdf_language(lang: Language) -> Language {
    match lang {
        Language::Ar => Language::En,
        other => other,
    }
}

/// Lays out every section and returns finalized pages (footers stamped).
pub fn compose(results: &[NormalizedResult], metadata: &ReportMetadata, lang: Language) -> Vec<Page> {
    let summary = RiskSummary::from_results(results);
    let mut layout = PageLayout::new();

    cover_page(&mut layout, metadata, lang);
    layout.new_page();
    table_of_contents(&mut layout, lang);
    layout.new_page();
    patient_overview(&mut layout, metadata, results.len(), lang);
    clinical_analysis(&mut layout, results, lang);
    layout.new_page();
    risk_assessment(&mut layout, &summary, lang);
    recommendations(&mut layout, &summary, lang);
    conclusion(&mut layout, &summary, lang);
    layout.new_page();
    medical_disclaimer(&mut layout, lang);

    layout.finish()
}

fn section_heading(layout: &mut PageLayout, title: &str, gap_after_rule: f32) {
    let y = layout.cursor();
    layout.text(title, MARGIN, y, SECTION_TITLE, Align::Left);
    layout.advance(12.0);
    let y = layout.cursor();
    layout.hline(MARGIN, PAGE_WIDTH - MARGIN, y, BORDER, 0.5);
    layout.advance(gap_after_rule);
}

fn cover_page(layout: &mut PageLayout, metadata: &ReportMetadata, lang: Language) {
    let center = PAGE_WIDTH / 2.0;
    layout.hline(MARGIN, PAGE_WIDTH - MARGIN, 30.0, BORDER, 1.0);

    let mut y = 50.0;
    layout.text(
        text(lang, TextKey::ReportTitle),
        center,
        y,
        Style::new(24.0, Face::Bold, TEXT_DARK),
        Align::Center,
    );
    y += 15.0;
    layout.text(
        text(lang, TextKey::AiSystemName),
        center,
        y,
        Style::new(10.0, Face::Regular, TEXT_MEDIUM),
        Align::Center,
    );
    y += 30.0;

    // Patient / report identification box
    let box_top = y;
    layout.rect(MARGIN, box_top, CONTENT_WIDTH, 60.0, Some(BG_LIGHT), Some((BORDER, 0.5)));
    y += 12.0;
    layout.text(
        format!("{}: {}", text(lang, TextKey::PatientId), metadata.patient_id),
        MARGIN + 10.0,
        y,
        Style::new(11.0, Face::Bold, TEXT_DARK),
        Align::Left,
    );
    y += 8.0;
    let id_style = Style::new(11.0, Face::Regular, TEXT_MEDIUM);
    layout.text(
        format!("{}: {}", text(lang, TextKey::ReportId), metadata.report_id),
        MARGIN + 10.0,
        y,
        id_style,
        Align::Left,
    );
    y += 8.0;
    layout.text(
        format!("{}: {}", text(lang, TextKey::DateGenerated), metadata.generated_date()),
        MARGIN + 10.0,
        y,
        id_style,
        Align::Left,
    );
    y = box_top + 60.0 + 20.0;

    layout.rect(
        MARGIN,
        y,
        CONTENT_WIDTH,
        25.0,
        Some(CALLOUT_FILL),
        Some((CALLOUT_STROKE, 0.5)),
    );
    layout.set_cursor(y + 8.0);
    layout.paragraph(
        text(lang, TextKey::Disclaimer),
        MARGIN + 10.0,
        CONTENT_WIDTH - 20.0,
        Style::new(9.0, Face::Italic, TEXT_MEDIUM),
        4.5,
    );
}

fn table_of_contents(layout: &mut PageLayout, lang: Language) {
    let y = layout.cursor();
    layout.text(
        text(lang, TextKey::TableOfContents),
        MARGIN,
        y,
        Style::new(18.0, Face::Bold, TEXT_DARK),
        Align::Left,
    );
    layout.advance(15.0);
    let y = layout.cursor();
    layout.hline(MARGIN, PAGE_WIDTH - MARGIN, y, BORDER, 0.5);
    layout.advance(10.0);

    let entry = Style::new(11.0, Face::Regular, TEXT_DARK);
    let leader = Style::new(11.0, Face::Regular, BORDER);
    let leader_end = PAGE_WIDTH - MARGIN - 30.0;
    for (key, page) in TOC_ENTRIES {
        let y = layout.cursor();
        let title = text(lang, *key);
        layout.text(title, MARGIN + 5.0, y, entry, Align::Left);
        let free = leader_end - (MARGIN + 5.0 + text_width(title, entry.size) + 3.0);
        let dots = (free / text_width(".", entry.size)).max(0.0) as usize;
        layout.text(".".repeat(dots), leader_end, y, leader, Align::Right);
        layout.text(page.to_string(), PAGE_WIDTH - MARGIN - 5.0, y, entry, Align::Right);
        layout.advance(8.0);
    }
}

fn patient_overview(
    layout: &mut PageLayout,
    metadata: &ReportMetadata,
    total_conditions: usize,
    lang: Language,
) {
    section_heading(layout, text(lang, TextKey::PatientOverview), 10.0);

    let mut lines = vec![format!("{}: {}", text(lang, TextKey::PatientId), metadata.patient_id)];
    if let Some(name) = &metadata.patient_name {
        lines.push(format!("{}: {}", text(lang, TextKey::PatientName), name));
    }
    lines.push(format!(
        "{}: {}",
        text(lang, TextKey::DateOfAnalysis),
        metadata.generated_date()
    ));
    if let Some(model) = &metadata.model_name {
        lines.push(format!("{}: {}", text(lang, TextKey::AiModel), model));
        if let Some(kind) = &metadata.analysis_type {
            lines.push(format!("{}: {}", text(lang, TextKey::AnalysisType), kind));
        }
    }
    lines.push(format!(
        "{}: {}",
        text(lang, TextKey::TotalConditions),
        total_conditions
    ));

    for line in lines {
        let y = layout.cursor();
        layout.text(line, MARGIN, y, BODY_MEDIUM, Align::Left);
        layout.advance(7.0);
    }
    layout.advance(8.0);
}

fn clinical_analysis(layout: &mut PageLayout, results: &[NormalizedResult], lang: Language) {
    layout.ensure_space(30.0);
    section_heading(layout, text(lang, TextKey::ClinicalAnalysis), 10.0);

    let top = layout.cursor();
    layout.rect(MARGIN, top, CONTENT_WIDTH, HEADER_HEIGHT, Some(BG_LIGHT), Some((BORDER, 0.5)));
    let header = Style::new(10.0, Face::Bold, TEXT_DARK);
    layout.text(text(lang, TextKey::ConditionHeader), MARGIN + 5.0, top + 7.0, header, Align::Left);
    layout.text(text(lang, TextKey::ProbabilityHeader), COL_VALUE, top + 7.0, header, Align::Left);
    layout.text(text(lang, TextKey::RiskLevelHeader), COL_RISK, top + 7.0, header, Align::Left);
    layout.advance(HEADER_HEIGHT);

    let name_chars = max_chars_for(CONTENT_WIDTH * 0.55, 9.0);
    for (index, result) in sorted_by_percentage(results).into_iter().enumerate() {
        layout.ensure_space(ROW_HEIGHT + 2.0);
        let y = layout.cursor();

        let background = if index % 2 == 0 { WHITE } else { BG_LIGHT };
        layout.rect(MARGIN, y, CONTENT_WIDTH, ROW_HEIGHT, Some(background), None);
        layout.hline(MARGIN, MARGIN + CONTENT_WIDTH, y, BORDER, 0.3);

        let level = result.risk_level();
        let (strong, _) = risk_colors(level);
        layout.text(
            truncate_to(&result.display_name(), name_chars),
            MARGIN + 5.0,
            y + 6.0,
            Style::new(9.0, Face::Regular, TEXT_DARK),
            Align::Left,
        );
        layout.text(
            format!("{:.2}%", result.percentage()),
            COL_VALUE,
            y + 6.0,
            Style::new(9.0, Face::Bold, strong),
            Align::Left,
        );
        layout.text(
            risk_label(lang, level),
            COL_RISK,
            y + 6.0,
            Style::new(8.0, Face::Regular, TEXT_MEDIUM),
            Align::Left,
        );
        layout.advance(ROW_HEIGHT);
    }

    let y = layout.cursor();
    layout.hline(MARGIN, MARGIN + CONTENT_WIDTH, y, BORDER, 0.5);
    layout.advance(15.0);
}

fn risk_assessment(layout: &mut PageLayout, summary: &RiskSummary, lang: Language) {
    section_heading(layout, text(lang, TextKey::RiskAssessment), 15.0);

    let box_width = (CONTENT_WIDTH - 16.0) / 3.0;
    let box_height = 20.0;
    let y = layout.cursor();
    for (slot, level) in [RiskLevel::High, RiskLevel::Moderate, RiskLevel::Low]
        .into_iter()
        .enumerate()
    {
        let (strong, light) = risk_colors(level);
        let x = MARGIN + (box_width + 8.0) * slot as f32;
        layout.rect(x, y, box_width, box_height, Some(light), Some((strong, 1.0)));
        layout.text(
            summary.count(level).to_string(),
            x + box_width / 2.0,
            y + 10.0,
            Style::new(16.0, Face::Bold, strong),
            Align::Center,
        );
        layout.text(
            risk_label(lang, level),
            x + box_width / 2.0,
            y + 16.0,
            Style::new(8.0, Face::Bold, strong),
            Align::Center,
        );
    }
    layout.advance(box_height + 20.0);
}

/// Advisory lines chosen from the tier counts.
pub fn recommendation_lines(summary: &RiskSummary, lang: Language) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.high > 0 {
        lines.push(format!(
            "{} {}",
            text(lang, TextKey::ConsultDoctor),
            text(lang, TextKey::UrgentConsultation)
        ));
    }
    if summary.moderate > 0 {
        lines.push(format!(
            "{} {}",
            text(lang, TextKey::FollowUp),
            text(lang, TextKey::ModerateEvaluation)
        ));
    }
    if summary.all_low() {
        lines.push(text(lang, TextKey::NoImmediateConcerns).to_string());
    }
    lines.push(text(lang, TextKey::ConsultProfessional).to_string());
    lines.push(text(lang, TextKey::ClinicalCorrelation).to_string());
    lines
}

fn recommendations(layout: &mut PageLayout, summary: &RiskSummary, lang: Language) {
    layout.ensure_space(50.0);
    section_heading(layout, text(lang, TextKey::Recommendations), 10.0);

    for line in recommendation_lines(summary, lang) {
        layout.paragraph(
            &format!("• {line}"),
            MARGIN + 5.0,
            CONTENT_WIDTH - 10.0,
            BODY,
            5.0,
        );
        layout.advance(2.0);
    }
    layout.advance(10.0);
}

/// Conclusion paragraph with the tier counts substituted in.
pub fn conclusion_text(summary: &RiskSummary, lang: Language) -> String {
    format!(
        "{} {} {} {} {} {} {} {} {} {}",
        text(lang, TextKey::ConclusionEvaluated),
        summary.total(),
        text(lang, TextKey::ConclusionConditions),
        text(lang, TextKey::ConclusionFindings),
        summary.high,
        text(lang, TextKey::ConclusionHigh),
        summary.moderate,
        text(lang, TextKey::ConclusionModerate),
        summary.low,
        text(lang, TextKey::ConclusionLow),
    ) + " "
        + text(lang, TextKey::ConclusionReview)
}

fn conclusion(layout: &mut PageLayout, summary: &RiskSummary, lang: Language) {
    layout.ensure_space(30.0);
    section_heading(layout, text(lang, TextKey::Conclusion), 10.0);
    layout.paragraph(&conclusion_text(summary, lang), MARGIN, CONTENT_WIDTH, BODY, 5.0);
}

fn medical_disclaimer(layout: &mut PageLayout, lang: Language) {
    let y = layout.cursor();
    layout.text(text(lang, TextKey::MedicalDisclaimer), MARGIN, y, SECTION_TITLE, Align::Left);
    layout.advance(15.0);
    let y = layout.cursor();
    layout.hline(MARGIN, PAGE_WIDTH - MARGIN, y, BORDER, 0.5);
    layout.advance(15.0);

    for key in DISCLAIMER_LINES {
        layout.ensure_space(10.0);
        layout.paragraph(text(lang, *key), MARGIN, CONTENT_WIDTH, BODY, 5.0);
        layout.advance(3.0);
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn face(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
        }
    }
}

fn pdf_color(c: Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(c.0) / 255.0,
        f32::from(c.1) / 255.0,
        f32::from(c.2) / 255.0,
        None,
    ))
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Flips a top-down layout coordinate into PDF space.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

fn aligned_x(x: f32, text: &str, size: f32, align: Align) -> f32 {
    match align {
        Align::Left => x,
        Align::Center => x - text_width(text, size) / 2.0,
        Align::Right => x - text_width(text, size),
    }
}

fn draw(layer: &PdfLayerReference, op: &DrawOp, fonts: &Fonts) {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            face,
            color,
            align,
        } => {
            layer.set_fill_color(pdf_color(*color));
            let x = aligned_x(*x, text, *size, *align);
            layer.use_text(text.as_str(), *size, Mm(x), flip(*y), fonts.face(*face));
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(fill) = fill {
                layer.set_fill_color(pdf_color(*fill));
            }
            if let Some((color, width)) = stroke {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(mm_to_pt(*width));
            }
            let rect = Rect::new(Mm(*x), flip(y + height), Mm(x + width), flip(*y)).with_mode(mode);
            layer.add_rect(rect);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(mm_to_pt(*width));
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), flip(*y1)), false),
                    (Point::new(Mm(*x2), flip(*y2)), false),
                ],
                is_closed: false,
            });
        }
    }
}

/// Renders finalized pages to PDF bytes.
///
/// Document id and dates come from the report, so only the per-save instance
/// id in the trailer differs between two renders of the same pages.
pub fn render(
    pages: &[Page],
    title: &str,
    metadata: &ReportMetadata,
) -> Result<Vec<u8>, ExportError> {
    let issued = OffsetDateTime::from_unix_timestamp(metadata.issued_at.timestamp())
        .map_err(|e| ExportError::Pdf(format!("PDF date error: {e}")))?;
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let doc = doc
        .with_document_id(metadata.report_id.clone())
        .with_creation_date(issued)
        .with_mod_date(issued)
        .with_metadata_date(issued);
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?,
    };

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for op in &page.ops {
            draw(&layer, op, &fonts);
        }
        if let Some(footer) = &page.footer {
            draw(
                &layer,
                &DrawOp::Text {
                    text: footer.clone(),
                    x: PAGE_WIDTH / 2.0,
                    y: FOOTER_Y,
                    size: FOOTER_SIZE,
                    face: Face::Regular,
                    color: FOOTER_GRAY,
                    align: Align::Center,
                },
                &fonts,
            );
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("PDF buffer error: {e}")))
}
