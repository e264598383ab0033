//! Query catalog: canonical questions mapped to prepared SQL and a response
//! template.
//!
//! Lookup is deliberately loose: an entry matches when its canonical question
//! is a case-insensitive substring of the user input, and the first match in
//! registration order wins. Overlapping questions can shadow each other, so
//! registration order is part of the catalog's contract.

#[derive(Debug, Clone)]
pub struct QueryCatalogEntry {
    pub canonical_question: &'static str,
    pub sql: &'static str,
    pub response_template: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    entries: Vec<QueryCatalogEntry>,
}

impl QueryCatalog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        canonical_question: &'static str,
        sql: &'static str,
        response_template: &'static str,
    ) {
        self.entries.push(QueryCatalogEntry {
            canonical_question,
            sql,
            response_template,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose canonical question is contained in `user_text`,
    /// compared case-insensitively. First match wins, not best match.
    pub fn lookup(&self, user_text: &str) -> Option<&QueryCatalogEntry> {
        let haystack = user_text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| haystack.contains(&entry.canonical_question.to_lowercase()))
    }

    /// The prepared questions for the buffet sales warehouse.
    pub fn buffet_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            "Which branch had the highest sales in February?",
            r#"
            SELECT
              f2.Branch_ID AS Branch_ID,
              f2.Branch_Name AS Branch_Name,
              SUM(f2.Total_Monthly_Sales) AS Sales
            FROM
              `golden-passkey-439311-c8.f2.month_sales_summary` AS f2
            WHERE
              f2.Year_Month = '2024-02'
            GROUP BY
              f2.Branch_ID, f2.Branch_Name
            ORDER BY
              Sales DESC
            LIMIT 1;
        "#,
            "The branch with the highest sales in February is {Branch_Name} (ID: {Branch_ID}) with total sales of {Sales} baht.",
        );

        catalog.register(
            "Percentage growth comparison for this year vs. last year",
            r#"
            SELECT
                f2_year_sales.Year AS Year,
                f2_year_sales.Branch_ID AS Branch_ID,
                f2_year_sales.Branch_Name AS Branch_Name,
                f2_year_sales.Growth_year AS Growth_year
            FROM
                `golden-passkey-439311-c8.f2.year_sales_summary` AS f2_year_sales
            WHERE
                f2_year_sales.Year = 2024
            GROUP BY
                f2_year_sales.Year, f2_year_sales.Branch_ID, f2_year_sales.Branch_Name, f2_year_sales.Growth_year
            ORDER BY
                Growth_year DESC;
        "#,
            "Percentage growth comparison for 2024:\n{result}",
        );

        catalog.register(
            "What is the % growth for each branch?",
            r#"
            SELECT
                f2_month_sales.Branch_ID AS Branch_ID,
                f2_month_sales.Branch_Name AS Branch_Name,
                f2_month_sales.Growth_year AS Percentage_Growth_year
            FROM
                `golden-passkey-439311-c8.f2.month_sales_summary` AS f2_month_sales
            WHERE f2_month_sales.Year_Month = '2024-02'
            GROUP BY
                f2_month_sales.Branch_ID, f2_month_sales.Branch_Name, f2_month_sales.Growth_year
            ORDER BY
                Percentage_Growth_year DESC;
        "#,
            "Here is the percentage growth for each branch in February 2024:\n{result}",
        );

        catalog.register(
            "Customer count changes this month",
            r#"
            WITH ranked_data AS (
                SELECT
                    f2_month_sales.Year_Month AS Year_Month,
                    f2_month_sales.Branch_ID AS Branch_ID,
                    f2_month_sales.Branch_Name AS Branch_Name,
                    f2_month_sales.Number_Of_customer AS Number_Of_customer,
                    LAG(f2_month_sales.Number_Of_customer) OVER (
                        PARTITION BY f2_month_sales.Branch_ID
                        ORDER BY f2_month_sales.Year_Month
                    ) AS Last_Month_Customers
                FROM
                    `golden-passkey-439311-c8.f2.month_sales_summary` AS f2_month_sales
            )
            SELECT
                Branch_ID,
                Branch_Name,
                Year_Month,
                Number_Of_customer,
                Last_Month_Customers,
                Number_Of_customer - Last_Month_Customers AS Difference
            FROM ranked_data
            WHERE Year_Month = '2024-02'
            ORDER BY
                Year_Month DESC;
        "#,
            "Here is the customer count change for February 2024:\n{result}",
        );

        catalog.register(
            "How much has the customer count increased this month?",
            r#"
            SELECT
                daily_sales.Sales_Date AS Sales_Date,
                daily_sales.Branch_ID AS Branch_ID,
                daily_sales.Branch_Name AS Branch_Name,
                daily_sales.Total_Daily_Sales AS Total_Daily_Sales
            FROM `golden-passkey-439311-c8.f2.daily_sales_summary` AS daily_sales
            WHERE DATE(daily_sales.Sales_Date) BETWEEN '2024-02-01' AND '2024-02-29'
            GROUP BY daily_sales.Branch_ID, daily_sales.Branch_Name, daily_sales.Sales_Date, daily_sales.Total_Daily_Sales;
        "#,
            "Customer count for February 2024 has increased as follows:\n{result}",
        );

        catalog.register(
            "What are today's sales for this branch?",
            r#"
            SELECT
                Branch_ID,
                Branch_Name,
                SUM(Total_Daily_Sales) AS Today_Sales
            FROM `golden-passkey-439311-c8.f2.daily_sales_summary`
            WHERE DATE(Sales_Date) = '2024-02-29'
            GROUP BY Branch_ID, Branch_Name;
        "#,
            "Today's sales for February 29, 2024, are:\n{result}",
        );

        catalog.register(
            "End-of-month sales target overview",
            r#"
            SELECT
                Branch_ID,
                Branch_Name,
                Total_Monthly_Sales AS Actual_Sales,
                Monthly_Target AS Target_Sales,
                Total_Monthly_Sales - Monthly_Target AS Diff
            FROM `golden-passkey-439311-c8.f2.month_sales_summary`
            WHERE Year_Month = '2024-02'
            ORDER BY Diff ASC
            LIMIT 1;
        "#,
            "End-of-month sales target overview for February 2024:\n{result}",
        );

        catalog.register(
            "Will the overall sales reach the set target by the end of this month?",
            r#"
            SELECT
                Year_Month,
                Branch_ID,
                Branch_Name,
                Total_Monthly_Sales AS This_Month_Sales,
                Last_Month_Sales,
                Total_Monthly_Sales - Last_Month_Sales AS Diff
            FROM `golden-passkey-439311-c8.f2.month_sales_summary`
            WHERE Year_Month = '2024-02'
            ORDER BY Diff ASC
            LIMIT 1;
        "#,
            "Sales progress for February 2024:\n{result}",
        );

        catalog.register(
            "Which branch is currently the furthest from its target?",
            r#"
            SELECT
                Branch_ID,
                Branch_Name,
                Total_Monthly_Sales AS Actual_Sales,
                Monthly_Target AS Target_Sales,
                Total_Monthly_Sales - Monthly_Target AS Diff
            FROM `golden-passkey-439311-c8.f2.month_sales_summary`
            WHERE Year_Month = '2024-02'
            ORDER BY Diff ASC
            LIMIT 1;
        "#,
            "The branch furthest from its target in February 2024 is {Branch_Name} (ID: {Branch_ID}) with actual sales of {Actual_Sales} baht, a target of {Target_Sales} baht, and a difference of {Diff} baht.",
        );

        catalog
    }
}
