//! Concatenate the pages of several PDFs into one document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, warn};

use super::Result;
use crate::error::PdfError;

/// Whether the path has a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// PDFs directly inside `dir`, sorted by path.
pub fn pdfs_in(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_pdf(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Merge every PDF in `folder` (sorted by name) into `folder/output_name`.
///
/// An existing file with the output name is not merged into itself.
/// Unreadable inputs are skipped.
pub fn merge_folder(folder: &Path, output_name: &str) -> Result<PathBuf> {
    let output_path = folder.join(output_name);

    let inputs: Vec<PathBuf> = pdfs_in(folder)?
        .into_iter()
        .filter(|p| *p != output_path)
        .collect();

    let mut documents = Vec::with_capacity(inputs.len());
    for path in &inputs {
        match Document::load(path) {
            Ok(doc) => {
                debug!("Merging {}", path.display());
                documents.push(doc);
            }
            Err(e) => warn!("Skipping unreadable PDF {}: {}", path.display(), e),
        }
    }

    if documents.is_empty() {
        return Err(PdfError::NoInput(folder.to_path_buf()));
    }

    let count = documents.len();
    let mut merged = merge_documents(documents)?;
    merged
        .save(&output_path)
        .map_err(|e| PdfError::Write(e.to_string()))?;

    info!("Merged {} PDFs into {}", count, output_path.display());
    Ok(output_path)
}

/// Merge documents in order into a single document.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    let mut max_id = 1;
    let mut pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut merged = Document::with_version("1.5");

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            let page = doc
                .get_object(page_id)
                .map_err(|e| PdfError::Parse(e.to_string()))?
                .to_owned();
            pages.insert(page_id, page);
        }
        objects.extend(doc.objects);
    }

    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut pages_root: Option<(ObjectId, Object)> = None;

    for (id, object) in objects.iter() {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" => {
                let keep_id = catalog.as_ref().map(|(cid, _)| *cid).unwrap_or(*id);
                catalog = Some((keep_id, object.clone()));
            }
            b"Pages" => {
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    if let Some((_, previous)) = pages_root.as_ref() {
                        if let Ok(previous) = previous.as_dict() {
                            dict.extend(previous);
                        }
                    }
                    let keep_id = pages_root.as_ref().map(|(pid, _)| *pid).unwrap_or(*id);
                    pages_root = Some((keep_id, Object::Dictionary(dict)));
                }
            }
            // Pages are re-inserted below; outlines would point at stale ids.
            b"Page" | b"Outlines" | b"Outline" => {}
            _ => {
                merged.objects.insert(*id, object.clone());
            }
        }
    }

    let (pages_id, pages_object) =
        pages_root.ok_or_else(|| PdfError::Parse("page tree root not found".to_string()))?;
    let (catalog_id, catalog_object) =
        catalog.ok_or_else(|| PdfError::Parse("catalog not found".to_string()))?;

    for (id, object) in pages.iter() {
        if let Ok(dict) = object.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            merged.objects.insert(*id, Object::Dictionary(dict));
        }
    }

    if let Ok(dict) = pages_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Count", pages.len() as u32);
        dict.set(
            "Kids",
            pages.keys().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(dict));
    }

    if let Ok(dict) = catalog_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Pages", pages_id);
        dict.remove(b"Outlines");
        merged.objects.insert(catalog_id, Object::Dictionary(dict));
    }

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn write_blank_pdf(path: &Path, page_count: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for _ in 0..page_count {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as u32,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("a.pdf")));
        assert!(is_pdf(Path::new("A.PDF")));
        assert!(!is_pdf(Path::new("a.pdf.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_merge_folder_concatenates_pages() {
        let dir = tempfile::tempdir().unwrap();
        write_blank_pdf(&dir.path().join("a.pdf"), 1);
        write_blank_pdf(&dir.path().join("b.pdf"), 2);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let output = merge_folder(dir.path(), "merged.pdf").unwrap();
        assert_eq!(output, dir.path().join("merged.pdf"));

        let merged = Document::load(&output).unwrap();
        assert_eq!(merged.get_pages().len(), 3);
    }

    #[test]
    fn test_merge_folder_without_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let err = merge_folder(dir.path(), "merged.pdf").unwrap_err();
        assert!(matches!(err, PdfError::NoInput(_)));
    }
}
