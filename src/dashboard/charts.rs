//! Chart generation and rendering for the dashboard.
//!
//! Each currency gets a bar chart comparing income with expenses for the
//! selected period. Charts are generated as JSON configuration for the
//! ECharts library and rendered with their HTML containers and JavaScript
//! initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::Bar,
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::prelude::ToPrimitive;

use crate::{dashboard::aggregation::CurrencyTotals, html::HeadElement};

const INCOME_COLOR: &str = "#16a34a";
const EXPENSE_COLOR: &str = "#dc2626";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: String,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl DashboardChart {
    /// The income versus expenses chart for `currency`.
    pub fn income_vs_expense(currency: &str, totals: &CurrencyTotals) -> Self {
        Self {
            id: format!("income-expense-chart-{}", currency.to_lowercase()),
            options: income_expense_chart(currency, totals).to_string(),
        }
    }
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[320px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

fn income_expense_chart(currency: &str, totals: &CurrencyTotals) -> Chart {
    let income = totals.income.to_f64().unwrap_or_default();
    let expense = totals.expense.to_f64().unwrap_or_default();

    Chart::new()
        .title(
            Title::new()
                .text(format!("Income vs Expenses ({currency})"))
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip(currency))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(60)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(vec!["Income", "Expenses"]),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(
            Bar::new()
                .name("Income")
                .stack("total")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(vec![income, 0.0]),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .stack("total")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(vec![0.0, expense]),
        )
}

fn currency_formatter(currency: &str) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
                style: 'currency',
                currency: '{currency}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";"
        ),
    )
}

fn currency_tooltip(currency: &str) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
