// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::style::{Color, Modifier, Style};

/// Terminal styling; stays on the 16-color palette so user terminal themes
/// keep working.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme;

impl TuiTheme {
    pub(crate) fn base_style(&self) -> Style {
        Style::default()
    }

    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(Color::LightGreen)
        } else {
            self.base_style().fg(Color::DarkGray)
        }
    }

    pub(crate) fn title_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::BOLD)
    }

    pub(crate) fn selection_style(&self) -> Style {
        self.base_style()
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn dim_style(&self) -> Style {
        self.base_style().fg(Color::DarkGray)
    }

    pub(crate) fn accent_style(&self) -> Style {
        self.base_style().fg(Color::LightGreen)
    }

    pub(crate) fn info_style(&self) -> Style {
        self.base_style().fg(Color::LightBlue)
    }

    pub(crate) fn success_style(&self) -> Style {
        self.base_style().fg(Color::LightGreen)
    }

    pub(crate) fn warning_style(&self) -> Style {
        self.base_style().fg(Color::Yellow)
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(Color::LightRed)
    }

    pub(crate) fn footer_key_style(&self) -> Style {
        self.base_style().fg(Color::Cyan)
    }

    pub(crate) fn footer_label_style(&self) -> Style {
        self.base_style().fg(Color::Gray)
    }
}
