// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;

use num::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use smoothbrot::config::preset;
use smoothbrot::field::iterate;
use smoothbrot::pixels::to_byte;
use smoothbrot::shading::base_color;
use smoothbrot::{composite, render, render_field, Palette, PixelBuffer, RenderConfig, Style, ViewWindow};

fn classic_view() -> ViewWindow {
    ViewWindow::new(-2.0, 1.0, -1.5, 1.5).unwrap()
}

fn flat_config(width: usize, height: usize, maxiter: usize) -> RenderConfig {
    RenderConfig::builder()
        .resolution(width, height)
        .maxiter(maxiter)
        .style(Style::flat(Palette::default()))
        .build()
        .unwrap()
}

fn is_black(buffer: &PixelBuffer, x: usize, y: usize) -> bool {
    buffer.get(x, y) == [0, 0, 0]
}

#[test]
fn render_is_deterministic_across_calls_and_thread_counts() {
    let view = ViewWindow::new(-0.8, -0.7, 0.05, 0.15).unwrap();
    let base = RenderConfig::builder()
        .resolution(60, 40)
        .maxiter(300)
        .oversample(2)
        .style(preset("filigree").unwrap())
        .threads(1)
        .build()
        .unwrap();
    let sequential = render(&view, &base).unwrap();
    assert_eq!(render(&view, &base).unwrap(), sequential);
    for &threads in &[2, 3, 8] {
        let config = base.to_builder().threads(threads).build().unwrap();
        assert_eq!(render(&view, &config).unwrap(), sequential, "{} threads", threads);
    }
}

#[test]
fn origin_is_in_the_set_for_any_budget() {
    for maxiter in (1..2000).step_by(97) {
        assert!(iterate(Complex::new(0.0, 0.0), maxiter, 4.0).is_interior());
    }
}

#[test]
fn fast_escape_is_small_and_stable_in_maxiter() {
    let c = Complex::new(2.0, 2.0);
    let mut previous = 0.0;
    for &maxiter in &[10, 20, 100, 1000, 10_000] {
        let escape = iterate(c, maxiter, 0.0).escape.unwrap();
        assert!(escape > 0.0 && escape < maxiter as f64);
        assert!(escape >= previous);
        previous = escape;
    }
}

#[test]
fn compositing_twice_gives_the_same_pixels() {
    let config = RenderConfig::builder()
        .resolution(40, 30)
        .maxiter(120)
        .style(preset("rich-boundaries").unwrap())
        .build()
        .unwrap();
    let field = render_field(&classic_view(), &config).unwrap();
    assert_eq!(composite(&field, &config).unwrap(), composite(&field, &config).unwrap());
}

#[test]
fn oversampling_keeps_the_output_size() {
    for os in 1..=3 {
        let config = flat_config(37, 23, 80).to_builder().oversample(os).build().unwrap();
        let field = render_field(&classic_view(), &config).unwrap();
        assert_eq!((field.width(), field.height()), (37 * os, 23 * os));
        let buffer = composite(&field, &config).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (37, 23));
    }
}

#[test]
fn disabled_effects_leave_pure_base_colouring() {
    let config = flat_config(30, 20, 150);
    let field = render_field(&classic_view(), &config).unwrap();
    let buffer = composite(&field, &config).unwrap();
    for y in 0..20 {
        for x in 0..30 {
            let expected = match field.get(x, y).escape {
                Some(escape) => {
                    let rgb = base_color(escape, 150, &config.style().palette);
                    [to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2])]
                }
                None => [0, 0, 0],
            };
            assert_eq!(buffer.get(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
}

// Largest 8-connected black region, by pixel count.
fn largest_black_region(buffer: &PixelBuffer) -> (usize, usize) {
    let (w, h) = (buffer.width(), buffer.height());
    let mut seen = vec![false; w * h];
    let mut total = 0;
    let mut largest = 0;
    for start in 0..w * h {
        if seen[start] || !is_black(buffer, start % w, start / w) {
            continue;
        }
        let mut size = 0;
        let mut queue = VecDeque::new();
        seen[start] = true;
        queue.push_back(start);
        while let Some(index) = queue.pop_front() {
            size += 1;
            let (x, y) = ((index % w) as isize, (index / w) as isize);
            for (dx, dy) in itertools::iproduct!(-1..=1, -1..=1) {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let next = ny as usize * w + nx as usize;
                if !seen[next] && is_black(buffer, nx as usize, ny as usize) {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        total += size;
        largest = largest.max(size);
    }
    (largest, total)
}

#[test]
fn classic_view_shows_a_symmetric_connected_set() {
    let buffer = render(&classic_view(), &flat_config(100, 100, 100)).unwrap();

    // Conjugate points land on mirrored rows.
    for y in 0..50 {
        for x in 0..100 {
            assert_eq!(buffer.get(x, y), buffer.get(x, 99 - y), "pixel ({}, {})", x, y);
        }
    }

    let (largest, total) = largest_black_region(&buffer);
    let fraction = total as f64 / 10_000.0;
    assert!(fraction > 0.12 && fraction < 0.35, "black fraction {}", fraction);
    assert!(largest as f64 >= 0.95 * total as f64, "{} of {}", largest, total);

    // The main cardioid (c = -0.25) and the period-2 bulb (c = -1) are
    // black; the corners are not.
    assert!(is_black(&buffer, 58, 49));
    assert!(is_black(&buffer, 33, 50));
    assert!(!is_black(&buffer, 0, 0));
    assert!(!is_black(&buffer, 99, 99));
}

#[test]
fn row_zero_is_the_top_of_the_picture() {
    // A window entirely above the real axis: the bottom row touches the
    // main cardioid, the top row is far outside.
    let view = ViewWindow::new(-0.5, 0.0, 0.0, 1.5).unwrap();
    let buffer = render(&view, &flat_config(20, 60, 100)).unwrap();
    assert!(is_black(&buffer, 10, 59));
    assert!(!is_black(&buffer, 10, 0));
}

#[test]
fn conjugate_points_escape_identically() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let c = Complex::new(rng.gen_range(-2.2..0.8), rng.gen_range(-1.3..1.3));
        let above = iterate(c, 400, 3.0);
        let below = iterate(c.conj(), 400, 3.0);
        assert_eq!(above.escape, below.escape, "c = {}", c);
        assert_eq!(above.normal, below.normal.conj(), "c = {}", c);
    }
}

#[test]
fn random_symmetric_windows_render_mirrored() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let re_min = rng.gen_range(-2.0..-0.5);
        let re_max = re_min + rng.gen_range(0.1..2.0);
        let half = rng.gen_range(0.05..1.2);
        let view = ViewWindow::new(re_min, re_max, -half, half).unwrap();
        let height = rng.gen_range(4..30) * 2;
        let buffer = render(&view, &flat_config(24, height, 200)).unwrap();
        for y in 0..height / 2 {
            for x in 0..24 {
                assert_eq!(buffer.get(x, y), buffer.get(x, height - 1 - y));
            }
        }
    }
}

#[test]
fn degenerate_windows_are_rejected_up_front() {
    assert!(ViewWindow::new(1.0, 1.0, -1.0, 1.0).is_err());
    assert!(ViewWindow::new(-1.0, 1.0, 0.5, -0.5).is_err());
    assert!(ViewWindow::new(0.3, 0.3 + 1e-18, 0.0, 1.0).is_err());
    assert!(RenderConfig::builder().maxiter(0).build().is_err());
    assert!(RenderConfig::builder().oversample(0).build().is_err());
    assert!(RenderConfig::builder().phases([0.0, 1.0, 0.5]).build().is_err());
}
