use criterion::{Criterion, black_box, criterion_group, criterion_main};

use typetype::provider::SEED_TEXTS;
use typetype::reporter::{ProgressReporter, progress_event};
use typetype::session::input::process_keystroke;
use typetype::session::{Keystroke, TypingSession};

fn long_passage() -> String {
    SEED_TEXTS.join(" ")
}

/// Types the passage with one wrong character every ~12 keys.
fn keystrokes(text: &str) -> Vec<Keystroke> {
    text.chars()
        .enumerate()
        .map(|(i, ch)| {
            if ch != ' ' && i % 12 == 5 {
                Keystroke::Char('#')
            } else {
                Keystroke::from_char(ch)
            }
        })
        .chain(std::iter::once(Keystroke::Space))
        .collect()
}

fn bench_type_passage(c: &mut Criterion) {
    let text = long_passage();
    let keys = keystrokes(&text);

    c.bench_function("type full passage", |b| {
        b.iter(|| {
            let mut session = TypingSession::new(600);
            session.load_passage(&text);
            session.start();
            for key in &keys {
                process_keystroke(&mut session, black_box(*key));
            }
            session.summary()
        })
    });
}

fn bench_backspace_heavy(c: &mut Criterion) {
    let text = long_passage();

    c.bench_function("type and erase every word", |b| {
        b.iter(|| {
            let mut session = TypingSession::new(600);
            session.load_passage(&text);
            session.start();
            for word in text.split(' ') {
                for ch in word.chars() {
                    session.type_character(black_box(ch));
                }
                for _ in word.chars() {
                    session.backspace();
                }
                for ch in word.chars() {
                    session.type_character(ch);
                }
                session.advance_word();
            }
            session.summary()
        })
    });
}

fn bench_progress_snapshot(c: &mut Criterion) {
    let text = long_passage();
    let mut session = TypingSession::new(600);
    session.load_passage(&text);
    session.start();
    for key in keystrokes(&text).into_iter().take(text.len() / 2) {
        process_keystroke(&mut session, key);
    }

    c.bench_function("progress event + display stats", |b| {
        b.iter(|| {
            let event = progress_event(black_box(&session));
            let stats = ProgressReporter::display(black_box(&session));
            (event, stats)
        })
    });
}

criterion_group!(
    benches,
    bench_type_passage,
    bench_backspace_heavy,
    bench_progress_snapshot,
);
criterion_main!(benches);
