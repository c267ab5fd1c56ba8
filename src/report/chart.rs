use anyhow::Result;
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::prelude::*;

use crate::models::NutrientRecord;

const CHART_SIZE: (u32, u32) = (640, 480);

/// Renders the nutrient breakdown as an SVG bar chart. Values are
/// independent magnitudes and are not assumed to sum to 100.
pub fn render_bar_chart(record: &NutrientRecord) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        if record.is_empty() {
            root.draw(&Text::new(
                "No nutrition data extracted.",
                (40, 40),
                ("sans-serif", 20).into_font(),
            ))?;
        } else {
            let names: Vec<String> = record.keys().cloned().collect();
            let values: Vec<u32> = record.values().copied().collect();
            let y_top = values.iter().copied().max().unwrap_or(1).max(1) + 5;

            let mut chart = ChartBuilder::on(&root)
                .caption("Nutrient Breakdown", ("sans-serif", 24).into_font())
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(48)
                .build_cartesian_2d((0u32..names.len() as u32).into_segmented(), 0u32..y_top)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|position| match position {
                    SegmentValue::CenterOf(index) if (*index as usize) < names.len() => {
                        names[*index as usize].clone()
                    }
                    _ => String::new(),
                })
                .y_desc("Percentage")
                .draw()?;

            chart.draw_series(values.iter().enumerate().map(|(index, value)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(index as u32), 0u32),
                        (SegmentValue::Exact(index as u32 + 1), *value),
                    ],
                    GREEN.mix(0.6).filled(),
                )
            }))?;
        }

        root.present()?;
    }

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_contains_nutrient_labels() {
        let mut record = NutrientRecord::new();
        record.insert("Carbohydrates".to_string(), 45);
        record.insert("Fats".to_string(), 20);

        let svg = render_bar_chart(&record).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Carbohydrates"));
        assert!(svg.contains("Fats"));
    }

    #[test]
    fn test_single_nutrient_renders() {
        let mut record = NutrientRecord::new();
        record.insert("Sugar".to_string(), 10);

        let svg = render_bar_chart(&record).unwrap();
        assert!(svg.contains("Sugar"));
    }

    #[test]
    fn test_empty_record_renders_placeholder() {
        let svg = render_bar_chart(&NutrientRecord::new()).unwrap();
        assert!(svg.contains("No nutrition data extracted."));
    }
}
