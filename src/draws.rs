//! Module for visualizing backtest results and candle charts.

use crate::engine::{Backtest, Candle};
use crate::errors::{Error, Result};
#[cfg(feature = "metrics")]
use crate::metrics::Summary;

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Aspect ratio for the generated charts.
const ASPECT_RATIO: f64 = 0.5625;
/// Size of the X-axis labels.
const X_LABEL_SIZE: i32 = 20;
/// Size of the Y-axis labels.
const Y_LABEL_SIZE: i32 = 20;

/// Output formats for the generated charts with output filename.
#[derive(Default)]
pub enum DrawOutput {
    /// Save to the output SVG file.
    Svg(&'static str),
    /// Save to the output PNG file.
    Png(&'static str),
    /// Save to the output HTML file (not implemented).
    Html(&'static str),
    /// Print to the current console (not implemented).
    #[default]
    Inner,
}

/// Configuration options for chart generation.
#[derive(Default)]
pub struct DrawOptions {
    /// Chart title.
    title: Option<String>,
    /// Output format and path.
    output: DrawOutput,
    /// Whether to show the volume chart.
    show_volume: bool,
    #[cfg(feature = "metrics")]
    /// Whether to show the summary line.
    show_summary: bool,
}

impl DrawOptions {
    /// Sets the chart title.
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the output format and path.
    pub fn draw_output(mut self, output: DrawOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables the volume chart.
    pub fn show_volume(mut self, show: bool) -> Self {
        self.show_volume = show;
        self
    }

    #[cfg(feature = "metrics")]
    /// Enables or disables the summary line below the chart.
    pub fn show_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }
}

/// Chart drawing utility for backtest visualization.
///
/// Renders the candle series with the report's position marker on the price
/// axis and the balance curves on a secondary axis.
pub struct Draw<'d> {
    backtest: &'d Backtest,
    options: DrawOptions,
}

impl<'d> From<&'d Backtest> for Draw<'d> {
    fn from(backtest: &'d Backtest) -> Self {
        Self {
            backtest,
            options: DrawOptions::default(),
        }
    }
}

impl Draw<'_> {
    /// Sets the drawing options.
    pub fn with_options(mut self, options: DrawOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates and saves the chart based on the configured options.
    pub fn plot(&self) -> Result<()> {
        let title = self.options.title.as_deref().unwrap_or("MBT Chart");
        let mut height_factor = 1.0;
        if self.options.show_volume {
            height_factor += 0.4;
        }
        #[cfg(feature = "metrics")]
        if self.options.show_summary {
            height_factor += 0.4;
        }

        let candle_count = self.backtest.candles().len() as u32;
        let width = 1280.max(10 * candle_count);
        let height = ((width as f64 * ASPECT_RATIO * height_factor) as u32).min(900);

        match self.options.output {
            DrawOutput::Svg(path) => self.plot_svg(path, width, height, title),
            DrawOutput::Png(path) => self.plot_png(path, width, height, title),
            DrawOutput::Html(_) => Err(Error::Plotters(
                "HTML output is not implemented".to_string(),
            )),
            DrawOutput::Inner => Err(Error::Plotters(
                "Inner display is not implemented".to_string(),
            )),
        }
    }

    /// Saves the chart as an SVG file.
    fn plot_svg(&self, path: &str, width: u32, height: u32, title: &str) -> Result<()> {
        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
        self.draw_chart(&root, title)
    }

    /// Saves the chart as a PNG file.
    fn plot_png(&self, path: &str, width: u32, height: u32, title: &str) -> Result<()> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
        self.draw_chart(&root, title)
    }

    /// Draws the main chart with price, volume and the summary line.
    fn draw_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        title: &str,
    ) -> Result<()> {
        let total_height = drawing_area.dim_in_pixel().1 as f64;
        let volume_height = if self.options.show_volume {
            total_height * 0.2
        } else {
            0.0
        };

        #[cfg(not(feature = "metrics"))]
        let summary_height = 0.0;
        #[cfg(feature = "metrics")]
        let summary_height = if self.options.show_summary {
            total_height * 0.2
        } else {
            0.0
        };

        let price_height = total_height - volume_height - summary_height;

        #[cfg(not(feature = "metrics"))]
        let rest_area = drawing_area.clone();
        #[cfg(feature = "metrics")]
        let (summary_area, rest_area) = if self.options.show_summary {
            drawing_area.split_vertically(summary_height as u32)
        } else {
            (drawing_area.clone(), drawing_area.clone())
        };

        let (price_area, volume_area) = if self.options.show_volume {
            rest_area.split_vertically(price_height as u32)
        } else {
            (rest_area.clone(), rest_area.clone())
        };

        // draw all charts
        self.draw_price_chart(&price_area, title)?;
        if self.options.show_volume {
            self.draw_volume_chart(&volume_area)?;
        }
        #[cfg(feature = "metrics")]
        if self.options.show_summary {
            self.draw_summary_chart(&summary_area)?;
        }

        drawing_area.present().map_err(|e| Error::Plotters(e.to_string()))
    }

    /// Draws the price chart (candlesticks, position marker, balances).
    fn draw_price_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        title: &str,
    ) -> Result<()> {
        let candles = self.backtest.candles();
        let rows = self.backtest.report().rows();

        let mut min_price = candles.iter().map(Candle::low).fold(f64::INFINITY, f64::min);
        let mut max_price = candles
            .iter()
            .map(Candle::high)
            .fold(f64::NEG_INFINITY, f64::max);
        // The position marker floats above or below the price action
        for row in rows {
            min_price = min_price.min(row.position_marker());
            max_price = max_price.max(row.position_marker());
        }

        let first_time = candles.first().ok_or(Error::CandleDataEmpty)?.open_time();
        let last_time = candles.last().ok_or(Error::CandleDataEmpty)?.close_time();
        let price_range = max_price - min_price;
        let price_padding = price_range * 0.1;

        let (min_balance, max_balance) = if rows.is_empty() {
            (0.0, 0.0)
        } else {
            (
                rows.iter()
                    .map(|row| row.minimal_balance())
                    .fold(f64::INFINITY, f64::min),
                rows.iter()
                    .map(|row| row.balance())
                    .fold(f64::NEG_INFINITY, f64::max),
            )
        };

        let (top, bottom) = if self.options.show_volume { (0, 0) } else { (10, 10) };
        let drawing_area = drawing_area.margin(top, bottom, 70, 70);
        let mut builder = ChartBuilder::on(&drawing_area);
        if !self.options.show_volume {
            builder.x_label_area_size(X_LABEL_SIZE);
        }

        let mut chart = builder
            .caption(title, ("sans-serif", 30).into_font())
            .y_label_area_size(Y_LABEL_SIZE)
            .right_y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(
                first_time..last_time,
                min_price - price_padding..max_price + price_padding,
            )
            .map_err(|e| Error::Plotters(e.to_string()))?
            .set_secondary_coord(first_time..last_time, min_balance..max_balance);

        if !rows.is_empty() {
            chart
                .configure_secondary_axes()
                .y_desc("Balance")
                .label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5)
                .draw()
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        let candle_count = candles.len();
        let x_labels = candle_count / 15;

        {
            let mut mesh = chart.configure_mesh();
            mesh.y_desc("Price")
                .y_label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5);

            if self.options.show_volume {
                mesh.disable_x_axis();
            } else {
                mesh.x_desc("Time")
                    .x_label_style(("sans-serif", X_LABEL_SIZE))
                    .x_labels(x_labels);
            }

            mesh.draw().map_err(|e| Error::Plotters(e.to_string()))?;
        }

        let candle_width = {
            let total_width = drawing_area.dim_in_pixel().0 as f64;
            let available_width = total_width - (X_LABEL_SIZE * 2) as f64;
            let candles_count = candles.len() as f64;
            (available_width / candles_count).max(5.0) as u32
        };

        chart
            .draw_series(candles.iter().map(|c| {
                let x = c.open_time();
                let open = c.open();
                let high = c.high();
                let low = c.low();
                let close = c.close();
                let color = if close >= open { GREEN.filled() } else { RED.filled() };
                CandleStick::new(x, open, high, low, close, color, color, candle_width)
            }))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        if !rows.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    rows.iter().map(|row| (row.open_time(), row.position_marker())),
                    BLACK,
                ))
                .map_err(|e| Error::Plotters(e.to_string()))?;

            chart
                .draw_secondary_series(LineSeries::new(
                    rows.iter().map(|row| (row.open_time(), row.balance())),
                    BLUE,
                ))
                .map_err(|e| Error::Plotters(e.to_string()))?;

            chart
                .draw_secondary_series(LineSeries::new(
                    rows.iter().map(|row| (row.open_time(), row.minimal_balance())),
                    RED,
                ))
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        Ok(())
    }

    /// Draws the volume chart.
    fn draw_volume_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let candles = self.backtest.candles();
        let max_volume = candles
            .iter()
            .map(Candle::volume)
            .fold(f64::NEG_INFINITY, f64::max);
        let volume_padding = max_volume * 0.1;
        let first_time = candles.first().ok_or(Error::CandleDataEmpty)?.open_time();
        let last_time = candles.last().ok_or(Error::CandleDataEmpty)?.close_time();
        let drawing_area = drawing_area.margin(0, 10, 70, 70);

        let mut chart = ChartBuilder::on(&drawing_area)
            .x_label_area_size(X_LABEL_SIZE)
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(first_time..last_time, 0.0..max_volume + volume_padding)
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let candle_count = candles.len();
        let x_labels = candle_count / 15;

        chart
            .configure_mesh()
            .x_desc("Time")
            .x_label_style(("sans-serif", X_LABEL_SIZE))
            .y_label_style(("sans-serif", Y_LABEL_SIZE))
            .x_labels(x_labels)
            .y_labels(3)
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        chart
            .draw_series(candles.iter().map(|c| {
                let volume = c.volume();
                let color = if c.ask() >= c.bid() {
                    GREEN.mix(0.3)
                } else {
                    RED.mix(0.3)
                };
                Rectangle::new(
                    [(c.open_time(), 0.0), (c.close_time(), volume)],
                    color.filled(),
                )
            }))
            .map(|_| ())
            .map_err(|e| Error::Plotters(e.to_string()))
    }

    /// Draws the summary line (if the "metrics" feature is enabled).
    #[cfg(feature = "metrics")]
    fn draw_summary_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let summary = Summary::from_report(self.backtest.report())?;

        let drawing_area = drawing_area.margin(30, 0, 70, 70);
        let mut summary_chart = ChartBuilder::on(&drawing_area)
            .margin(20)
            .build_cartesian_2d(0.0..1.0, 0f64..100f64)
            .map_err(|e| Error::Plotters(e.to_string()))?;

        summary_chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let text = Text::new(
            format!(
                "Total return: {}% | Sharpe: {} | Max balance drawdown: {}% | Positive trades: {}%",
                summary.total_return(),
                summary.sharpe(),
                summary.max_balance_drawdown(),
                summary.positive_trades()
            ),
            (0.0, 50.0),
            ("sans-serif", 28).into_font(),
        );

        summary_chart
            .draw_series([text])
            .map(|_| ())
            .map_err(|e| Error::Plotters(e.to_string()))
    }
}
