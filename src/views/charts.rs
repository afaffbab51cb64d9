// src/views/charts.rs
//
// Gráficos desenhados com plotters em um SVG (string), gerados no servidor.
// Cada função recebe a agregação já pronta e devolve um `Chart`; entrada vazia
// vira o placeholder "No data available".

use std::f64::consts::PI;

use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use rust_decimal::prelude::ToPrimitive;

use crate::{
    common::error::AppError,
    models::dashboard::{CategoryAverage, LabelCount, QuantityBucket},
    views::{
        format::currency,
        theme::{hex_channels, THEME},
    },
};

const WIDTH: u32 = 600;
const HEIGHT: u32 = 400;
const FONT: &str = "sans-serif";

pub const NO_DATA: &str = "No data available";

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: &'static str,
    pub svg: String,
    pub placeholder: bool,
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

struct Bar {
    label: String,
    value: f64,
    annotation: Option<String>,
}

// =============================================================================
//  OS QUATRO GRÁFICOS
// =============================================================================

pub fn average_price_by_coffee_type(data: &[CategoryAverage]) -> Result<Chart, AppError> {
    const TITLE: &str = "Average Price by Coffee Type";
    if data.is_empty() {
        return placeholder(TITLE);
    }

    let bars: Vec<Bar> = data
        .iter()
        .map(|entry| Bar {
            label: entry.coffee_type.clone(),
            value: entry.average_price.to_f64().unwrap_or(0.0),
            annotation: Some(currency(entry.average_price)),
        })
        .collect();

    bar_chart(TITLE, ("Coffee Type", "Average Price (฿)"), &bars, true)
}

/// Histograma: uma barra por faixa de quantidade, sem espaço entre as barras.
pub fn quantity_distribution(data: &[QuantityBucket]) -> Result<Chart, AppError> {
    const TITLE: &str = "Order Quantity Distribution";
    if data.is_empty() {
        return placeholder(TITLE);
    }

    let bars: Vec<Bar> = data
        .iter()
        .map(|bucket| Bar {
            label: bucket.label(),
            value: bucket.orders as f64,
            annotation: None,
        })
        .collect();

    bar_chart(TITLE, ("Quantity", "Number of Orders"), &bars, false)
}

/// Pizza começando às 12h, no sentido anti-horário.
pub fn order_status_distribution(data: &[LabelCount]) -> Result<Chart, AppError> {
    const TITLE: &str = "Order Status Distribution";
    let total: usize = data.iter().map(|c| c.orders).sum();
    if total == 0 {
        return placeholder(TITLE);
    }

    render(TITLE, |root| {
        let area = root.titled(TITLE, title_style())?;
        let (w, h) = area.dim_in_pixel();
        let (cx, cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
        let radius = f64::from(w.min(h)) * 0.36;
        let point = |angle: f64, r: f64| {
            ((cx + r * angle.cos()).round() as i32, (cy - r * angle.sin()).round() as i32)
        };

        let mut angle = PI / 2.0;
        for (i, slice) in data.iter().enumerate() {
            let fraction = slice.orders as f64 / total as f64;
            let sweep = 2.0 * PI * fraction;

            if fraction > 0.0 {
                // Arco aproximado a cada 2 graus; uma fatia de 100% é o círculo inteiro
                let steps = ((sweep / (PI / 90.0)).ceil() as usize).max(2);
                let mut outline = vec![point(0.0, 0.0)];
                outline.extend(
                    (0..=steps).map(|s| point(angle + sweep * s as f64 / steps as f64, radius)),
                );
                area.draw(&Polygon::new(outline, rgb(THEME.accent_at(i)).filled()))?;
            }

            let mid = angle + sweep / 2.0;
            area.draw(&Text::new(
                percent_label(fraction),
                point(mid, radius * 0.6),
                label_style(11).pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
            area.draw(&Text::new(
                slice.label.clone(),
                point(mid, radius * 1.15),
                label_style(11).pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;

            angle += sweep;
        }
        Ok(())
    })
}

pub fn orders_by_coffee_type(data: &[LabelCount]) -> Result<Chart, AppError> {
    const TITLE: &str = "Orders by Coffee Type";
    if data.is_empty() {
        return placeholder(TITLE);
    }

    let bars: Vec<Bar> = data
        .iter()
        .map(|entry| Bar {
            label: entry.label.clone(),
            value: entry.orders as f64,
            annotation: None,
        })
        .collect();

    bar_chart(TITLE, ("Coffee Type", "Number of Orders"), &bars, true)
}

// =============================================================================
//  DESENHO
// =============================================================================

/// Abre o backend SVG sobre uma `String`, pinta o fundo e entrega a área ao `draw`.
fn render<F>(title: &'static str, draw: F) -> Result<Chart, AppError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&rgb(THEME.background)).map_err(draw_error)?;
        draw(&root).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }

    Ok(Chart {
        title,
        svg,
        placeholder: false,
    })
}

fn draw_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao desenhar o gráfico: {e}"))
}

fn placeholder(title: &'static str) -> Result<Chart, AppError> {
    let mut chart = render(title, |root| {
        let area = root.titled(title, title_style())?;
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            NO_DATA,
            ((w / 2) as i32, (h / 2) as i32),
            label_style(16).pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        Ok(())
    })?;
    chart.placeholder = true;
    Ok(chart)
}

// `spaced`: barras categóricas com margem e cores alternadas; sem ele, histograma.
fn bar_chart(
    title: &'static str,
    (x_desc, y_desc): (&str, &str),
    bars: &[Bar],
    spaced: bool,
) -> Result<Chart, AppError> {
    let max = bars.iter().map(|b| b.value).fold(0.0, f64::max);
    // folga no topo para as anotações
    let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };
    let primary = rgb(THEME.primary);

    render(title, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, title_style())
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_desc(x_desc)
            .y_desc(y_desc)
            .axis_style(primary)
            .label_style((FONT, 10, &primary))
            .axis_desc_style((FONT, 12, &primary))
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) => bars
                    .get(*i as usize)
                    .map(|bar| bar.label.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        for (i, bar) in bars.iter().enumerate() {
            let (fill, margin) = if spaced {
                (rgb(THEME.accent_at(i)), 12)
            } else {
                (rgb(THEME.secondary), 0)
            };
            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(fill.filled())
                    .margin(margin)
                    .data(std::iter::once((i as u32, bar.value))),
            )?;

            if let Some(text) = &bar.annotation {
                chart.draw_series(std::iter::once(Text::new(
                    text.clone(),
                    (SegmentValue::CenterOf(i as u32), bar.value),
                    label_style(11).pos(Pos::new(HPos::Center, VPos::Bottom)),
                )))?;
            }
        }
        Ok(())
    })
}

fn title_style() -> TextStyle<'static> {
    (FONT, 16)
        .into_font()
        .style(FontStyle::Bold)
        .color(&rgb(THEME.primary))
}

fn label_style(size: u32) -> TextStyle<'static> {
    (FONT, size).into_font().color(&rgb(THEME.primary))
}

fn rgb(hex: &str) -> RGBColor {
    let (r, g, b) = hex_channels(hex);
    RGBColor(r, g, b)
}

fn percent_label(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
