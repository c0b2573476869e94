/// End-to-end organizer integration tests.
///
/// Every test works on a real temporary directory: files are created, moved
/// into category folders, and moved back through the undo stack.
use reclaim_core::organizer::{Category, Organizer};
use reclaim_core::scanner::Scanner;
use reclaim_core::Error;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ── Classification precedence ────────────────────────────────────────────────

/// A financial PDF must land with the financial documents, not the generic ones.
#[test]
fn financial_pdf_precedence() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("downloads/extrato_boleto.pdf");
    write(&src, "bank");
    let org = Organizer::new(tmp.path().join("home"));

    let res = org.organize_file(&src).unwrap();
    assert_eq!(
        res.category.as_ref().map(Category::name),
        Some(Category::FINANCIAL)
    );
    assert_eq!(
        res.to,
        tmp.path()
            .join("home")
            .join("Importantes")
            .join("Financeiros")
            .join("extrato_boleto.pdf")
    );
    assert!(res.to.parent().unwrap().is_dir());
}

// ── Collision handling ───────────────────────────────────────────────────────

/// Two distinct files named `report.pdf` from different folders: the second
/// lands at `report (1).pdf` and the first is untouched.
#[test]
fn same_name_is_disambiguated() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("a/report.pdf");
    let second = tmp.path().join("b/report.pdf");
    write(&first, "first");
    write(&second, "second");
    let org = Organizer::new(tmp.path().join("sorted"));

    let r1 = org.organize_file(&first).unwrap();
    let r2 = org.organize_file(&second).unwrap();

    let docs = tmp.path().join("sorted/Importantes/Documentos");
    assert_eq!(r1.to, docs.join("report.pdf"));
    assert_eq!(r2.to, docs.join("report (1).pdf"));
    assert_eq!(read(&r1.to), "first");
    assert_eq!(read(&r2.to), "second");
}

/// A pre-existing file in the category folder is never overwritten.
#[test]
fn existing_destination_file_is_untouched() {
    let tmp = TempDir::new().unwrap();
    let org = Organizer::new(tmp.path().join("sorted"));
    let existing = tmp.path().join("sorted/images/cat.png");
    write(&existing, "original");
    let src = tmp.path().join("in/cat.png");
    write(&src, "newcomer");

    let res = org.organize_file(&src).unwrap();
    assert_eq!(res.to, tmp.path().join("sorted/images/cat (1).png"));
    assert_eq!(read(&existing), "original");
    assert_eq!(read(&res.to), "newcomer");
}

// ── Undo ─────────────────────────────────────────────────────────────────────

/// Undo restores the exact original path and pops the history entry.
#[test]
fn undo_restores_original_path() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("inbox/song.mp3");
    write(&src, "music");
    let org = Organizer::new(tmp.path().join("sorted"));

    let moved = org.organize_file(&src).unwrap();
    assert_eq!(org.history().len(), 1);

    let undone = org.undo().unwrap();
    assert!(undone.success);
    assert_eq!(undone.from, moved.to);
    assert_eq!(undone.to, src);
    assert_eq!(read(&src), "music");
    assert!(!moved.to.exists());
    assert!(org.history().is_empty());
}

/// Repeated undo walks the stack backwards one entry at a time.
#[test]
fn undo_is_lifo() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.zip");
    write(&a, "a");
    write(&b, "b");
    let org = Organizer::new(tmp.path().join("out"));
    org.organize_file(&a).unwrap();
    org.organize_file(&b).unwrap();

    assert_eq!(org.undo().unwrap().to, b);
    assert!(b.exists() && !a.exists());
    assert_eq!(org.undo().unwrap().to, a);
    assert!(a.exists());
    assert!(matches!(org.undo(), Err(Error::NoHistory)));
}

/// Undo recreates the original parent directory if it was removed.
#[test]
fn undo_recreates_missing_parent() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("gone/away/doc.txt");
    write(&src, "doc");
    let org = Organizer::new(tmp.path().join("out"));
    org.organize_file(&src).unwrap();
    fs::remove_dir_all(tmp.path().join("gone")).unwrap();

    org.undo().unwrap();
    assert_eq!(read(&src), "doc");
}

/// Undo replaces whatever now occupies the original path.
#[test]
fn undo_overwrites_original_slot() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("clip.mp4");
    write(&src, "original");
    let org = Organizer::new(tmp.path().join("out"));
    org.organize_file(&src).unwrap();
    write(&src, "impostor");

    org.undo().unwrap();
    assert_eq!(read(&src), "original");
}

/// A failed undo puts the entry back so it can be retried.
#[test]
fn failed_undo_is_retryable() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("notes.txt");
    write(&src, "keep");
    let org = Organizer::new(tmp.path().join("out"));
    let moved = org.organize_file(&src).unwrap();

    // Take the file away, fail the undo, put it back, retry.
    let stash = tmp.path().join("stash");
    fs::rename(&moved.to, &stash).unwrap();
    assert!(matches!(org.undo(), Err(Error::NotFound(_))));
    assert_eq!(org.history().len(), 1);

    fs::rename(&stash, &moved.to).unwrap();
    org.undo().unwrap();
    assert_eq!(read(&src), "keep");
}

/// History snapshots are stable and detached from the organizer.
#[test]
fn history_snapshots_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("x.json");
    write(&src, "{}");
    let org = Organizer::new(tmp.path().join("out"));
    org.organize_file(&src).unwrap();

    let first = org.history();
    let second = org.history();
    assert_eq!(first, second);
    assert_eq!(first[0].source, src);

    let mut mutated = first;
    mutated.clear();
    assert_eq!(org.history().len(), 1);
}

// ── Directory batches ────────────────────────────────────────────────────────

/// Only direct-child regular files are organized; failures are collected.
#[test]
fn organize_directory_is_shallow() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("inbox");
    write(&dir.join("a.jpg"), "a");
    write(&dir.join("b.pdf"), "b");
    write(&dir.join(".hidden"), "h");
    write(&dir.join("nested/c.txt"), "c");
    let org = Organizer::new(&dir);

    let summary = org.organize_directory(&dir).unwrap();
    assert_eq!(summary.total_processed, 2);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 0);
    assert!(dir.join("images/a.jpg").exists());
    assert!(dir.join("Importantes/Documentos/b.pdf").exists());
    assert!(dir.join(".hidden").exists());
    assert!(dir.join("nested/c.txt").exists());
    assert_eq!(org.history().len(), 2);
}

/// One file failing does not abort the batch; the failure is reported and
/// only the successful move is recorded.
#[test]
fn organize_directory_collects_partial_failures() {
    let tmp = TempDir::new().unwrap();
    let inbox = tmp.path().join("inbox");
    let dest = tmp.path().join("sorted");
    write(&inbox.join("a.jpg"), "picture");
    write(&inbox.join("b.pdf"), "document");
    // A regular file where the images folder should be.
    write(&dest.join("images"), "in the way");
    let org = Organizer::new(&dest);

    let summary = org.organize_directory(&inbox).unwrap();
    assert_eq!(summary.total_processed, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].path, inbox.join("a.jpg"));
    assert!(!summary.failures[0].error.is_empty());
    assert_eq!(summary.results[0].from, inbox.join("b.pdf"));

    assert!(inbox.join("a.jpg").exists());
    assert!(dest.join("Importantes/Documentos/b.pdf").exists());
    assert_eq!(org.history().len(), 1);
}

#[test]
fn organize_directory_rejects_bad_targets() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("f.txt");
    write(&file, "x");
    let org = Organizer::new(tmp.path());

    assert!(matches!(
        org.organize_directory(tmp.path().join("nope")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        org.organize_directory(&file),
        Err(Error::NotADirectory(_))
    ));
}

// ── Scanner → Organizer ──────────────────────────────────────────────────────

/// Files reported by the scanner can be handed straight to the organizer.
#[test]
fn organize_scanned_duplicates() {
    let tmp = TempDir::new().unwrap();
    let scan_root = tmp.path().join("scan");
    write(&scan_root.join("one/meme.png"), "lol");
    write(&scan_root.join("two/meme.png"), "lol");

    let report = Scanner::new().scan(&scan_root).unwrap();
    assert_eq!(report.duplicates.len(), 1);

    let org = Organizer::new(tmp.path().join("sorted"));
    for member in &report.duplicates[0].members {
        let res = org.organize_file(&member.path).unwrap();
        assert_eq!(
            res.category.as_ref().map(Category::name),
            Some(Category::MEMES)
        );
    }
    let memes = tmp.path().join("sorted/Lixo_Liberar/Memes");
    assert!(memes.join("meme.png").exists());
    assert!(memes.join("meme (1).png").exists());
}
