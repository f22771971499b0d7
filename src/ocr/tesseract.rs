//! Tesseract OCR via the `tesseract` executable.
//!
//! The normalized image is PNG-encoded in memory and piped on stdin; no
//! temp files. TSV output gives one row per word with its box and
//! confidence, and words are grouped back into lines so that each line
//! becomes one detection.

use super::{BoundingRegion, OcrEngine, OcrRequest, TextDetection};
use crate::error::EngineError;
use crate::normalize::ImageBuffer;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const ENGINE: &str = "tesseract";

/// TSV row level for a single word.
const WORD_LEVEL: u32 = 5;

/// Tesseract engine handle. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    languages: Vec<String>,
    page_segmentation: u8,
    version: String,
}

impl TesseractEngine {
    /// Locate the binary and check that the requested languages are installed.
    ///
    /// `binary` overrides the PATH lookup.
    pub fn new(
        binary: Option<&Path>,
        languages: &[String],
        page_segmentation: u8,
    ) -> Result<Self, EngineError> {
        let binary = match binary {
            Some(path) => path.to_path_buf(),
            None => which::which("tesseract").map_err(|e| {
                EngineError::unavailable(ENGINE, format!("tesseract not found on PATH: {}", e))
            })?,
        };

        let version_output = Command::new(&binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                EngineError::unavailable(ENGINE, format!("cannot run {}: {}", binary.display(), e))
            })?;
        // Older releases print the version banner on stderr.
        let banner = format!(
            "{}{}",
            String::from_utf8_lossy(&version_output.stdout),
            String::from_utf8_lossy(&version_output.stderr)
        );
        let version = banner.lines().next().unwrap_or("tesseract").trim().to_string();

        let engine = Self {
            binary,
            languages: languages.to_vec(),
            page_segmentation,
            version,
        };
        engine.check_languages(languages)?;
        log::info!(
            "[OCR] Using {} at {} (psm {})",
            engine.version,
            engine.binary.display(),
            engine.page_segmentation
        );
        Ok(engine)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Warm-up runs with the languages checked at construction.
    fn warm_up_request(&self) -> OcrRequest {
        OcrRequest {
            languages: self.languages.clone(),
            prefer_gpu: false,
        }
    }

    fn check_languages(&self, languages: &[String]) -> Result<(), EngineError> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .map_err(|e| EngineError::unavailable(ENGINE, format!("--list-langs failed: {}", e)))?;
        let listing = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let installed = parse_language_list(&listing);
        if installed.is_empty() {
            log::warn!("[OCR] Could not read installed language list, skipping check");
            return Ok(());
        }

        let missing: Vec<String> = languages
            .iter()
            .map(|l| tesseract_language(l))
            .filter(|l| !installed.iter().any(|i| i == l))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::unavailable(
                ENGINE,
                format!("language data not installed: {}", missing.join(", ")),
            ));
        }
        Ok(())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        ENGINE
    }

    fn warm_up(&self) -> Result<(), EngineError> {
        let start = std::time::Instant::now();
        let blank = crate::normalize::normalize_image(crate::normalize::ImageInput::Decoded(
            image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                32,
                32,
                image::Rgb([255, 255, 255]),
            )),
        ))
        .map_err(|e| EngineError::invocation(ENGINE, e.to_string()))?;
        self.recognize(&blank, &self.warm_up_request())?;
        log::info!("[OCR] Warm-up complete in {}ms", start.elapsed().as_millis());
        Ok(())
    }

    fn recognize(
        &self,
        image: &ImageBuffer,
        request: &OcrRequest,
    ) -> Result<Vec<TextDetection>, EngineError> {
        if request.prefer_gpu {
            log::debug!("[OCR] GPU requested; tesseract runs on CPU");
        }

        let png_bytes = image
            .to_png_bytes()
            .map_err(|e| EngineError::invocation(ENGINE, format!("PNG encode failed: {}", e)))?;
        let languages = language_argument(&request.languages);
        let psm = self.page_segmentation.to_string();

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &languages, "--psm", &psm, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::invocation(ENGINE, format!("spawn failed: {}", e)))?;

        // stdin is closed at the end of the arm so tesseract sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png_bytes),
            None => Err(std::io::Error::other("stdin not captured")),
        };

        // Always reap the child, even when it hung up on us early.
        let output = child.wait_with_output()?;
        let tsv = invocation_output(written, output)?;
        Ok(parse_tsv(&tsv))
    }
}

/// Turn a finished tesseract run into its stdout.
///
/// A failed exit wins over a failed write: tesseract closing the pipe is
/// the symptom, its stderr is the cause.
fn invocation_output(written: std::io::Result<()>, output: Output) -> Result<String, EngineError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::invocation(
            ENGINE,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }
    if let Err(e) = written {
        return Err(EngineError::invocation(
            ENGINE,
            format!("writing image to stdin failed: {}", e),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Map common two-letter codes to Tesseract's traineddata names.
/// Anything else is passed through untouched.
pub fn tesseract_language(code: &str) -> String {
    let mapped = match code.trim().to_lowercase().as_str() {
        "en" => "eng",
        "fr" => "fra",
        "de" => "deu",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        "nl" => "nld",
        "ru" => "rus",
        "ja" => "jpn",
        "ko" => "kor",
        "zh" | "ch_sim" => "chi_sim",
        _ => return code.trim().to_string(),
    };
    mapped.to_string()
}

fn language_argument(languages: &[String]) -> String {
    if languages.is_empty() {
        return "eng".to_string();
    }
    languages
        .iter()
        .map(|l| tesseract_language(l))
        .collect::<Vec<_>>()
        .join("+")
}

/// Parse `--list-langs` output. The header line ends with a colon.
fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.ends_with(':') && !l.contains(' '))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct LineKey {
    page: u32,
    block: u32,
    paragraph: u32,
    line: u32,
}

struct LineAccumulator {
    key: LineKey,
    words: Vec<String>,
    confidence_sum: f64,
    region: BoundingRegion,
}

impl LineAccumulator {
    fn finish(self) -> TextDetection {
        let confidence = self.confidence_sum / self.words.len() as f64 / 100.0;
        TextDetection {
            region: self.region,
            text: self.words.join(" "),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Group TSV word rows into one detection per line, in emission order.
///
/// Columns: level page_num block_num par_num line_num word_num left top
/// width height conf text. Rows that are not words, have no text, or carry
/// a negative confidence are skipped.
pub fn parse_tsv(tsv: &str) -> Vec<TextDetection> {
    let mut detections = Vec::new();
    let mut current: Option<LineAccumulator> = None;

    for row in tsv.lines() {
        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 12 {
            continue;
        }
        let numbers: Option<Vec<u32>> = columns[..10].iter().map(|c| c.trim().parse().ok()).collect();
        let Some(numbers) = numbers else {
            // header row or garbage
            continue;
        };
        if numbers[0] != WORD_LEVEL {
            continue;
        }
        let Ok(conf) = columns[10].trim().parse::<f64>() else {
            continue;
        };
        let text = columns[11..].join("\t");
        let text = text.trim();
        if conf < 0.0 || text.is_empty() {
            continue;
        }

        let key = LineKey {
            page: numbers[1],
            block: numbers[2],
            paragraph: numbers[3],
            line: numbers[4],
        };
        let region = BoundingRegion {
            left: numbers[6],
            top: numbers[7],
            width: numbers[8],
            height: numbers[9],
        };

        match current.as_mut() {
            Some(acc) if acc.key == key => {
                acc.words.push(text.to_string());
                acc.confidence_sum += conf;
                acc.region = acc.region.union(&region);
            }
            _ => {
                if let Some(done) = current.take() {
                    detections.push(done.finish());
                }
                current = Some(LineAccumulator {
                    key,
                    words: vec![text.to_string()],
                    confidence_sum: conf,
                    region,
                });
            }
        }
    }

    if let Some(done) = current {
        detections.push(done.finish());
    }
    detections
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn words_are_grouped_into_lines() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t500\t400\t-1\t",
            "4\t1\t1\t1\t1\t0\t20\t10\t300\t40\t-1\t",
            "5\t1\t1\t1\t1\t1\t20\t10\t100\t40\t96.0\tONE",
            "5\t1\t1\t1\t1\t2\t130\t12\t190\t38\t90.0\tDOES",
            "5\t1\t2\t1\t1\t1\t40\t350\t80\t30\t80.5\tNOT",
            "5\t1\t2\t1\t1\t2\t130\t350\t120\t30\t70.5\tSIMPLY",
        ]);
        let detections = parse_tsv(&input);
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "ONE DOES");
        assert!((detections[0].confidence - 0.93).abs() < 1e-9);
        assert_eq!(
            detections[0].region,
            BoundingRegion { left: 20, top: 10, width: 300, height: 40 }
        );
        assert_eq!(detections[1].text, "NOT SIMPLY");
        assert!((detections[1].confidence - 0.755).abs() < 1e-9);
    }

    #[test]
    fn negative_confidence_and_blank_words_are_skipped() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t-1\tghost",
            "5\t1\t1\t1\t1\t2\t0\t0\t10\t10\t55\t   ",
        ]);
        assert!(parse_tsv(&input).is_empty());
    }

    #[test]
    fn header_only_output_has_no_detections() {
        assert!(parse_tsv(HEADER).is_empty());
        assert!(parse_tsv("").is_empty());
    }

    #[test]
    fn same_line_number_in_new_block_starts_new_detection() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tTOP",
            "5\t1\t3\t1\t1\t1\t0\t90\t10\t10\t90\tBOTTOM",
        ]);
        let texts: Vec<String> = parse_tsv(&input).into_iter().map(|d| d.text).collect();
        assert_eq!(texts, ["TOP", "BOTTOM"]);
    }

    #[test]
    fn language_codes_are_mapped_and_joined() {
        assert_eq!(tesseract_language("en"), "eng");
        assert_eq!(tesseract_language("deu"), "deu");
        assert_eq!(
            language_argument(&["en".to_string(), "fr".to_string()]),
            "eng+fra"
        );
        assert_eq!(language_argument(&[]), "eng");
    }

    #[test]
    fn language_list_header_is_ignored() {
        let listing = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\nfra\n";
        assert_eq!(parse_language_list(listing), ["eng", "osd", "fra"]);
    }

    fn engine_at(binary: PathBuf, languages: &[&str]) -> TesseractEngine {
        TesseractEngine {
            binary,
            languages: languages.iter().map(|l| l.to_string()).collect(),
            page_segmentation: 3,
            version: "tesseract test".to_string(),
        }
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        // wait(2) encoding: exit code in the high byte
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn warm_up_uses_configured_languages() {
        let engine = engine_at(PathBuf::from("tesseract"), &["de"]);
        let request = engine.warm_up_request();
        assert_eq!(language_argument(&request.languages), "deu");
        assert!(!request.prefer_gpu);
    }

    #[cfg(unix)]
    #[test]
    fn failed_exit_reports_stderr_over_broken_pipe() {
        let output = Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: b"Failed loading language 'eng'\n".to_vec(),
        };
        let broken = Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        let err = invocation_output(broken, output).unwrap_err();
        assert!(matches!(err, EngineError::Invocation { .. }));
        assert!(err.to_string().contains("Failed loading language 'eng'"));
    }

    #[cfg(unix)]
    #[test]
    fn write_error_after_clean_exit_is_invocation_error() {
        let output = Output {
            status: exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        let broken = Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        let err = invocation_output(broken, output).unwrap_err();
        assert!(err.to_string().contains("writing image to stdin failed"));
    }

    #[cfg(unix)]
    #[test]
    fn clean_run_returns_stdout() {
        let output = Output {
            status: exit_status(0),
            stdout: HEADER.as_bytes().to_vec(),
            stderr: Vec::new(),
        };
        assert_eq!(invocation_output(Ok(()), output).unwrap(), HEADER);
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_is_reaped_and_reported() {
        let Ok(binary) = which::which("false") else {
            eprintln!("SKIP: `false` not on PATH");
            return;
        };
        let engine = engine_at(binary, &["en"]);
        // incompressible enough to overflow the pipe buffer
        let noisy = image::RgbImage::from_fn(512, 512, |x, y| {
            let h = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503).rotate_left(7);
            image::Rgb([(h >> 3) as u8, (h >> 11) as u8, (h >> 19) as u8])
        });
        let buffer = crate::normalize::normalize_image(crate::normalize::ImageInput::Decoded(
            image::DynamicImage::ImageRgb8(noisy),
        ))
        .unwrap();
        let err = engine.recognize(&buffer, &OcrRequest::default()).unwrap_err();
        assert!(matches!(err, EngineError::Invocation { .. }), "got {:?}", err);
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let err = TesseractEngine::new(
            Some(Path::new("/nonexistent/bin/tesseract")),
            &["en".to_string()],
            3,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable { .. }));
    }
}
