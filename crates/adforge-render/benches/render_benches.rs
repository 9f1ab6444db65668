use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use adforge_core::{AdDescription, Color, FrameBuffer, LayoutKind, RenderMode};
use adforge_render::export::to_data_url;
use adforge_render::text::BUILTIN_FAMILY;
use adforge_render::{plan_layout, Background, Compositor, FontBook, LayoutContext, LocalImageSource};

fn create_ad(layout: LayoutKind) -> AdDescription {
    AdDescription::new("Summer Collection: fresh styles for long days outside", "Shop Now")
        .with_subtitle("Free shipping on every order this week")
        .with_colors("#1A73E8", "#FBBC04")
        .with_layout(layout)
}

fn bench_render_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("adforge_render_pass");
    group.sample_size(20);
    let fonts = Arc::new(FontBook::new());

    for mode in [RenderMode::Export, RenderMode::Edit] {
        for layout in LayoutKind::ALL {
            let ad = create_ad(layout);
            let mut compositor = Compositor::raster(fonts.clone(), mode);
            group.bench_function(format!("{}_{}_gradient", mode, layout), |b| {
                b.iter(|| compositor.render_sync(&ad, Background::Gradient).unwrap());
            });
        }
    }

    let background = FrameBuffer::solid(1920, 1280, &Color::rgb(0.2, 0.4, 0.6));
    let ad = create_ad(LayoutKind::BottomOverlay);
    let mut compositor = Compositor::raster(fonts.clone(), RenderMode::Export);
    group.bench_function("export_bottom-overlay_image", |b| {
        b.iter(|| compositor.render_sync(&ad, Background::Image(&background)).unwrap());
    });

    group.finish();
}

fn bench_layout_planning(c: &mut Criterion) {
    let fonts = FontBook::new();
    let ad = create_ad(LayoutKind::Centered);
    let ctx = LayoutContext::new(1080, 1080, RenderMode::Export, BUILTIN_FAMILY);
    c.bench_function("plan_layout_centered", |b| {
        b.iter(|| plan_layout(&ad, &ctx, &fonts).unwrap());
    });
}

fn bench_async_render(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fonts = Arc::new(FontBook::new());
    let background = to_data_url(&FrameBuffer::solid(640, 480, &Color::rgb(0.9, 0.5, 0.1))).unwrap();
    let ad = create_ad(LayoutKind::Centered).with_background(background);
    let (fonts, ad) = (&fonts, &ad);

    let mut group = c.benchmark_group("adforge_async_render");
    group.sample_size(10);
    group.bench_function("export_centered_data_url_background", |b| {
        b.to_async(&runtime).iter(move || async move {
            let mut compositor = Compositor::raster(fonts.clone(), RenderMode::Export);
            let outcome = compositor.render(ad, &LocalImageSource).await.unwrap();
            outcome
        });
    });
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut compositor = Compositor::raster(Arc::new(FontBook::new()), RenderMode::Export);
    compositor
        .render_sync(&create_ad(LayoutKind::SplitScreen), Background::Gradient)
        .unwrap();
    let mut group = c.benchmark_group("adforge_export");
    group.sample_size(10);
    group.bench_function("encode_png_1080", |b| {
        b.iter(|| compositor.export_png().unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_render_passes,
    bench_layout_planning,
    bench_async_render,
    bench_export
);
criterion_main!(benches);
