//! Per-channel PSD input and channel alignment.
//!
//! PSD estimates arrive from an external estimator as one windows × bins
//! matrix of decibel values per channel, plus the shared bin centers.
//! [`ThreeComponentPsd::align`] reconciles the three channels into one
//! [`AlignedPsd`] with an ascending frequency axis. Shape disagreements are
//! logged and resolved by truncating to the smallest common dimension.

use serde::{Deserialize, Serialize};

use crate::stats::column_mean;

/// Unit of the bin centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinAxis {
    /// Bin centers are frequencies in Hz.
    #[default]
    Frequency,
    /// Bin centers are periods in seconds.
    Period,
}

/// PSD estimates for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsdSeries {
    /// Bin centers (frequency or period, see [`BinAxis`]).
    pub bin_centers: Vec<f64>,
    /// Decibel PSD values, one row per time window.
    pub values_db: Vec<Vec<f64>>,
}

impl PsdSeries {
    /// Create a channel from bin centers and a windows × bins dB matrix.
    pub fn new(bin_centers: Vec<f64>, values_db: Vec<Vec<f64>>) -> Self {
        Self {
            bin_centers,
            values_db,
        }
    }

    /// Number of time windows.
    pub fn window_count(&self) -> usize {
        self.values_db.len()
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.bin_centers.len()
    }

    /// Per-bin mean over all windows.
    pub fn time_average(&self) -> Vec<f64> {
        let columns = self
            .values_db
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.bin_count()))
            .min()
            .unwrap_or(0);
        column_mean(&self.values_db, columns)
    }

    /// Smallest usable bin count across the centers and every row.
    fn usable_bins(&self) -> usize {
        self.values_db
            .iter()
            .map(Vec::len)
            .fold(self.bin_count(), usize::min)
    }
}

/// Three synchronized channels from one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeComponentPsd {
    /// Vertical channel.
    pub vertical: PsdSeries,
    /// First horizontal channel.
    pub horizontal_1: PsdSeries,
    /// Second horizontal channel.
    pub horizontal_2: PsdSeries,
    /// Unit of the bin centers, shared by all channels.
    #[serde(default)]
    pub axis: BinAxis,
    /// PSD analysis window length in seconds.
    pub window_length_s: f64,
}

impl ThreeComponentPsd {
    /// Bundle three channels with frequency bin centers.
    pub fn new(
        vertical: PsdSeries,
        horizontal_1: PsdSeries,
        horizontal_2: PsdSeries,
        window_length_s: f64,
    ) -> Self {
        Self {
            vertical,
            horizontal_1,
            horizontal_2,
            axis: BinAxis::Frequency,
            window_length_s,
        }
    }

    /// Declare the unit of the bin centers.
    pub fn with_axis(mut self, axis: BinAxis) -> Self {
        self.axis = axis;
        self
    }

    fn channels(&self) -> [(&'static str, &PsdSeries); 3] {
        [
            ("vertical", &self.vertical),
            ("horizontal_1", &self.horizontal_1),
            ("horizontal_2", &self.horizontal_2),
        ]
    }

    /// Reconcile the channels into one aligned, frequency-ascending matrix set.
    pub fn align(&self) -> AlignedPsd {
        let channels = self.channels();

        let bins = channels
            .iter()
            .map(|(_, c)| c.usable_bins())
            .min()
            .unwrap_or(0);
        let windows = channels
            .iter()
            .map(|(_, c)| c.window_count())
            .min()
            .unwrap_or(0);

        for (name, channel) in channels {
            if channel.bin_count() != bins || channel.usable_bins() != bins {
                tracing::warn!(
                    channel = name,
                    bins = channel.bin_count(),
                    usable = channel.usable_bins(),
                    common = bins,
                    "bin count differs between channels, truncating to common length"
                );
            }
            if channel.window_count() != windows {
                tracing::warn!(
                    channel = name,
                    windows = channel.window_count(),
                    common = windows,
                    "window count differs between channels, trimming longest"
                );
            }
        }

        let reference = &self.vertical.bin_centers[..bins];
        for (name, channel) in &channels[1..] {
            if channel.bin_centers[..bins] != *reference {
                tracing::warn!(
                    channel = *name,
                    "bin centers differ from the vertical channel; using vertical bins"
                );
            }
        }

        let mut frequencies: Vec<f64> = match self.axis {
            BinAxis::Frequency => reference.to_vec(),
            BinAxis::Period => reference.iter().map(|t| 1.0 / t).collect(),
        };

        let take = |series: &PsdSeries| -> Vec<Vec<f64>> {
            series.values_db[..windows]
                .iter()
                .map(|row| row[..bins].to_vec())
                .collect()
        };
        let mut vertical = take(&self.vertical);
        let mut horizontal_1 = take(&self.horizontal_1);
        let mut horizontal_2 = take(&self.horizontal_2);

        let descending =
            frequencies.len() > 1 && frequencies[0] > frequencies[frequencies.len() - 1];
        if descending {
            frequencies.reverse();
            for row in vertical
                .iter_mut()
                .chain(horizontal_1.iter_mut())
                .chain(horizontal_2.iter_mut())
            {
                row.reverse();
            }
        }

        tracing::debug!(bins, windows, flipped = descending, "aligned PSD channels");

        AlignedPsd {
            frequencies,
            vertical,
            horizontal_1,
            horizontal_2,
            window_length_s: self.window_length_s,
        }
    }
}

/// Channels trimmed to a common shape on an ascending frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPsd {
    /// Ascending bin frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Vertical dB matrix (windows × bins).
    pub vertical: Vec<Vec<f64>>,
    /// First horizontal dB matrix.
    pub horizontal_1: Vec<Vec<f64>>,
    /// Second horizontal dB matrix.
    pub horizontal_2: Vec<Vec<f64>>,
    /// PSD analysis window length in seconds.
    pub window_length_s: f64,
}

impl AlignedPsd {
    /// Number of bins shared by all channels.
    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Number of windows shared by all channels.
    pub fn window_count(&self) -> usize {
        self.vertical.len()
    }
}
