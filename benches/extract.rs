//! Benchmarks for the extraction pipeline.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use otp_sieve::{CodeExtractor, RawEmailText, extract_code, is_valid_otp};

fn html_newsletter(rows: usize) -> String {
    let mut body = String::from("<html><body><table style=\"width:600px\">");
    for i in 0..rows {
        body.push_str(&format!(
            "<tr><td style=\"color:#393939;padding:12px\">Item {i} of our weekly security digest</td></tr>"
        ));
    }
    body.push_str("</table></body></html>");
    body
}

fn bench_labelled(c: &mut Criterion) {
    let body = "<p>Hi,</p><p>Your verification code is <b>482913</b>.</p><p>It expires in 10 minutes.</p>";
    c.bench_function("extract_labelled_email", |bench| {
        bench.iter(|| black_box(extract_code(Some("Sign-in attempt"), Some(black_box(body)))))
    });
}

fn bench_no_code(c: &mut Criterion) {
    let body = html_newsletter(500);
    c.bench_function("extract_large_html_no_code", |bench| {
        bench.iter(|| black_box(extract_code(Some("Weekly digest"), Some(black_box(&body)))))
    });
}

fn bench_digit_heavy(c: &mut Criterion) {
    // Every token is a rejected candidate, so all tiers run to exhaustion.
    let body = format!("Your code: 123456 {}", "2024 123123 393939 0000 ".repeat(400));
    c.bench_function("extract_adversarial_digits", |bench| {
        bench.iter(|| black_box(extract_code(None, Some(black_box(&body)))))
    });
}

fn bench_phrase_dense(c: &mut Criterion) {
    // Every phrase opens a proximity window and none holds a code.
    let body = "Log in to confirm. This code will expire. ".repeat(2_000);
    c.bench_function("extract_phrase_dense_no_code", |bench| {
        bench.iter(|| black_box(extract_code(None, Some(black_box(&body)))))
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut emails: Vec<_> = (0..200)
        .map(|i| RawEmailText::new(format!("Newsletter {i}"), html_newsletter(20)))
        .collect();
    emails.push(RawEmailText::new("Your login code", "Use 582047 to sign in"));
    let extractor = CodeExtractor::default();
    c.bench_function("extract_latest_201", |bench| {
        bench.iter(|| black_box(extractor.extract_latest(black_box(&emails))))
    });
}

fn bench_validate(c: &mut Criterion) {
    let codes = ["482913", "123456", "123123", "393939", "A1B2C3", "2024", "12px"];
    c.bench_function("validate_mixed", |bench| {
        bench.iter(|| {
            for code in codes {
                black_box(is_valid_otp(black_box(code)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_labelled,
    bench_no_code,
    bench_digit_heavy,
    bench_phrase_dense,
    bench_batch,
    bench_validate
);
criterion_main!(benches);
