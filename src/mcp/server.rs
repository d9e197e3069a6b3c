use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::RwLock;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParams, ProtocolVersion, RawResource, RawResourceTemplate,
        ReadResourceRequestParams, ReadResourceResult, Resource, ResourceContents,
        ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::domain::booking::{BlackoutInterval, BookingStatus};
use crate::domain::date_range::DateRange;
use crate::domain::equipment::{EquipmentCategory, EquipmentSpec};
use crate::domain::resource::RentalResource;
use crate::error::RentalError;
use crate::service::{AvailabilitySearch, BookingRequest, BookingService};

// ---------- Resource Store ----------

/// Thread-safe store of tool output exposed as MCP resources.
/// Keys are URIs like `scoovio://booking/{id}`, values are text content.
#[derive(Clone, Default)]
pub struct ResourceStore {
    entries: Arc<RwLock<HashMap<String, ResourceEntry>>>,
}

#[derive(Clone)]
struct ResourceEntry {
    name: String,
    text: String,
}

impl ResourceStore {
    async fn insert(&self, uri: impl Into<String>, name: impl Into<String>, text: String) {
        self.entries.write().await.insert(
            uri.into(),
            ResourceEntry {
                name: name.into(),
                text,
            },
        );
    }

    async fn get(&self, uri: &str) -> Option<ResourceEntry> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn list(&self) -> Vec<(String, String)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(uri, entry)| (uri.clone(), entry.name.clone()))
            .collect()
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore").finish()
    }
}

// ---------- Tool parameter types ----------

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RegisterResourceToolParams {
    /// Unique resource ID (e.g. "scooter-42")
    pub id: String,
    /// Price per day, must be greater than zero
    pub daily_rate: f64,
    /// Price per 7-day week. Omit if the resource has no weekly rate.
    pub weekly_rate: Option<f64>,
    /// Price per 30-day month. Omit if the resource has no monthly rate.
    pub monthly_rate: Option<f64>,
    /// Refundable deposit authorized at booking time (never added to the total)
    pub security_deposit: Option<f64>,
    /// Shortest allowed rental in days (default: 1)
    pub min_rental_days: Option<u32>,
    /// Longest allowed rental in days (default: unbounded)
    pub max_rental_days: Option<u32>,
    /// Equipment details, tagged by `type` (MOBILITY_SCOOTER or BABY_STROLLER)
    pub equipment: Option<EquipmentSpec>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ResourceIdToolParams {
    /// Resource ID
    pub resource_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DateRangeToolParams {
    /// Resource ID
    pub resource_id: String,
    /// First day of the rental (YYYY-MM-DD, inclusive)
    pub start_date: String,
    /// Return day (YYYY-MM-DD, exclusive)
    pub end_date: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CreateBookingToolParams {
    /// Resource ID
    pub resource_id: String,
    /// ID of the renter making the booking
    pub renter_id: String,
    /// First day of the rental (YYYY-MM-DD, inclusive)
    pub start_date: String,
    /// Return day (YYYY-MM-DD, exclusive)
    pub end_date: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct UpdateBookingStatusToolParams {
    /// Booking ID returned by rental_create_booking
    pub booking_id: String,
    /// Target status
    pub status: BookingStatus,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListBookingsToolParams {
    /// Resource ID
    pub resource_id: String,
    /// Only return bookings in this status
    pub status: Option<BookingStatus>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddBlackoutToolParams {
    /// Resource ID
    pub resource_id: String,
    /// First blocked day (YYYY-MM-DD, inclusive)
    pub start_date: String,
    /// Day the block ends (YYYY-MM-DD, exclusive)
    pub end_date: String,
    /// Why the owner blocked these dates (max 100 characters)
    pub reason: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchAvailableToolParams {
    /// First day of the rental (YYYY-MM-DD, inclusive). Requires end_date.
    pub start_date: Option<String>,
    /// Return day (YYYY-MM-DD, exclusive). Requires start_date.
    pub end_date: Option<String>,
    /// Only this kind of equipment
    pub category: Option<EquipmentCategory>,
    /// Lowest daily rate to include
    pub min_daily_rate: Option<f64>,
    /// Highest daily rate to include
    pub max_daily_rate: Option<f64>,
}

impl SearchAvailableToolParams {
    fn into_search(self) -> crate::error::Result<AvailabilitySearch> {
        let range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange::parse(&start, &end)?),
            (None, None) => None,
            _ => {
                return Err(RentalError::InvalidParams {
                    reason: "start_date and end_date must be given together".into(),
                });
            }
        };
        Ok(AvailabilitySearch {
            range,
            category: self.category,
            min_daily_rate: optional_money("min_daily_rate", self.min_daily_rate)?,
            max_daily_rate: optional_money("max_daily_rate", self.max_daily_rate)?,
        })
    }
}

fn money(field: &'static str, value: f64) -> crate::error::Result<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| RentalError::InvalidParams {
            reason: format!("{field} must be a finite number, got {value}"),
        })
}

fn optional_money(
    field: &'static str,
    value: Option<f64>,
) -> crate::error::Result<Option<Decimal>> {
    value.map(|v| money(field, v)).transpose()
}

impl RegisterResourceToolParams {
    fn into_resource(self) -> crate::error::Result<RentalResource> {
        Ok(RentalResource {
            id: self.id,
            daily_rate: money("daily_rate", self.daily_rate)?,
            weekly_rate: optional_money("weekly_rate", self.weekly_rate)?,
            monthly_rate: optional_money("monthly_rate", self.monthly_rate)?,
            security_deposit: optional_money("security_deposit", self.security_deposit)?,
            min_rental_days: self.min_rental_days.unwrap_or(1),
            max_rental_days: self.max_rental_days,
            equipment: self.equipment,
        })
    }
}

fn tool_error(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}

// ---------- MCP Server ----------

#[derive(Clone)]
pub struct ScoovioMcpServer {
    service: Arc<BookingService>,
    currency: String,
    tool_router: ToolRouter<Self>,
    resources: ResourceStore,
}

#[tool_router]
impl ScoovioMcpServer {
    pub fn new(service: Arc<BookingService>, currency: impl Into<String>) -> Self {
        Self {
            service,
            currency: currency.into(),
            tool_router: Self::tool_router(),
            resources: ResourceStore::default(),
        }
    }

    #[tool(
        name = "rental_register_resource",
        description = "Register or replace a rentable resource with its daily rate, optional weekly/monthly rates, deposit, rental-length bounds and equipment details. Must be called before a resource can be quoted or booked.",
        annotations(read_only_hint = false, idempotent_hint = true)
    )]
    async fn rental_register_resource(
        &self,
        Parameters(params): Parameters<RegisterResourceToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = params.id.clone();
        let registered = match params.into_resource() {
            Ok(resource) => self.service.register_resource(resource).await,
            Err(e) => Err(e),
        };
        match registered {
            Ok(resource) => {
                let text = resource.to_string();
                let uri = format!("scoovio://resource/{}", resource.id);
                let name = format!("Resource: {}", resource.id);
                self.resources.insert(uri, name, text.clone()).await;
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Registered.\n\n{text}"
                ))]))
            }
            Err(e) => Ok(tool_error(format!(
                "Failed to register resource '{id}': {e}. Rates must be positive and max_rental_days at least min_rental_days."
            ))),
        }
    }

    #[tool(
        name = "rental_get_resource",
        description = "Get a registered resource's rates, deposit, rental-length bounds and equipment details.",
        annotations(read_only_hint = true)
    )]
    async fn rental_get_resource(
        &self,
        Parameters(params): Parameters<ResourceIdToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.service.resource(&params.resource_id).await {
            Ok(resource) => Ok(CallToolResult::success(vec![Content::text(
                resource.to_string(),
            )])),
            Err(e) => Ok(tool_error(format!(
                "{e}. Use rental_register_resource to add it first."
            ))),
        }
    }

    #[tool(
        name = "rental_check_availability",
        description = "Check whether a resource is free for [start_date, end_date). The end date is the return day and is not occupied. Reports conflicting bookings/blackouts and whether the length satisfies the resource's min/max rental days.",
        annotations(read_only_hint = true)
    )]
    async fn rental_check_availability(
        &self,
        Parameters(params): Parameters<DateRangeToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = match DateRange::parse(&params.start_date, &params.end_date) {
            Ok(range) => self.service.check_availability(&params.resource_id, range).await,
            Err(e) => Err(e),
        };
        match report {
            Ok(report) => Ok(CallToolResult::success(vec![Content::text(
                report.to_string(),
            )])),
            Err(e) => Ok(tool_error(format!(
                "Availability check failed for '{}': {e}",
                params.resource_id
            ))),
        }
    }

    #[tool(
        name = "rental_quote_price",
        description = "Price a rental for [start_date, end_date) without booking it. Applies the best single rate tier (monthly, then weekly, then daily), then service fee and tax. The security deposit is shown separately and is not part of the total.",
        annotations(read_only_hint = true)
    )]
    async fn rental_quote_price(
        &self,
        Parameters(params): Parameters<DateRangeToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let quote = match DateRange::parse(&params.start_date, &params.end_date) {
            Ok(range) => self.service.quote(&params.resource_id, range).await,
            Err(e) => Err(e),
        };
        match quote {
            Ok(quote) => {
                let text = format!("Currency: {}\n{quote}", self.currency);
                let uri = format!("scoovio://quote/{}", params.resource_id);
                let name = format!("Quote: {}", params.resource_id);
                self.resources.insert(uri, name, text.clone()).await;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(tool_error(format!(
                "Quote failed for '{}': {e}",
                params.resource_id
            ))),
        }
    }

    #[tool(
        name = "rental_create_booking",
        description = "Book a resource for [start_date, end_date). Validates dates and rental length, checks availability, prices the rental and stores a CONFIRMED booking. Fails if the dates are taken, including when a concurrent booking wins the race.",
        annotations(read_only_hint = false, idempotent_hint = false)
    )]
    async fn rental_create_booking(
        &self,
        Parameters(params): Parameters<CreateBookingToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let confirmation = match DateRange::parse(&params.start_date, &params.end_date) {
            Ok(range) => {
                self.service
                    .book(BookingRequest {
                        resource_id: params.resource_id.clone(),
                        renter_id: params.renter_id,
                        range,
                    })
                    .await
            }
            Err(e) => Err(e),
        };
        match confirmation {
            Ok(confirmation) => {
                let text = format!("Currency: {}\n{confirmation}", self.currency);
                let uri = format!("scoovio://booking/{}", confirmation.booking.id);
                let name = format!("Booking: {}", confirmation.booking.id);
                self.resources.insert(uri, name, text.clone()).await;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e @ (RentalError::Unavailable { .. } | RentalError::BookingConflict { .. })) => {
                Ok(tool_error(format!(
                    "Booking failed: {e}. Use rental_unavailable_dates to see which dates are taken."
                )))
            }
            Err(e) => Ok(tool_error(format!(
                "Booking failed for '{}': {e}",
                params.resource_id
            ))),
        }
    }

    #[tool(
        name = "rental_update_booking_status",
        description = "Move a booking through its lifecycle: PENDING -> CONFIRMED -> ACTIVE -> COMPLETED, or CANCELLED before the rental starts. Cancelling frees the dates.",
        annotations(read_only_hint = false, idempotent_hint = false)
    )]
    async fn rental_update_booking_status(
        &self,
        Parameters(params): Parameters<UpdateBookingStatusToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .service
            .update_status(&params.booking_id, params.status)
            .await
        {
            Ok(booking) => {
                let mut text = booking.to_string();
                if booking.status.is_terminal() {
                    text.push_str("\nThis booking is closed and its dates are free again.\n");
                }
                let uri = format!("scoovio://booking/{}", booking.id);
                let name = format!("Booking: {}", booking.id);
                self.resources.insert(uri, name, text.clone()).await;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(tool_error(format!(
                "Status update failed for booking '{}': {e}",
                params.booking_id
            ))),
        }
    }

    #[tool(
        name = "rental_list_bookings",
        description = "List the bookings of a resource, optionally filtered by status.",
        annotations(read_only_hint = true)
    )]
    async fn rental_list_bookings(
        &self,
        Parameters(params): Parameters<ListBookingsToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .service
            .list_bookings(&params.resource_id, params.status)
            .await
        {
            Ok(bookings) => {
                let mut text = String::new();
                if bookings.is_empty() {
                    text.push_str("No bookings found.\n");
                } else {
                    let _ = writeln!(text, "Found {} booking(s):\n", bookings.len());
                    for (i, booking) in bookings.iter().enumerate() {
                        let _ = writeln!(
                            text,
                            "{}. {} | {} | renter {} | {} | total {}",
                            i + 1,
                            booking.id,
                            booking.range,
                            booking.renter_id,
                            booking.status,
                            booking.total_amount,
                        );
                    }
                }
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(tool_error(format!(
                "Failed to list bookings for '{}': {e}",
                params.resource_id
            ))),
        }
    }

    #[tool(
        name = "rental_add_blackout",
        description = "Block [start_date, end_date) on a resource so it cannot be booked, e.g. for maintenance or owner use.",
        annotations(read_only_hint = false, idempotent_hint = false)
    )]
    async fn rental_add_blackout(
        &self,
        Parameters(params): Parameters<AddBlackoutToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let added = match DateRange::parse(&params.start_date, &params.end_date) {
            Ok(range) => self
                .service
                .add_blackout(
                    &params.resource_id,
                    BlackoutInterval {
                        range,
                        reason: params.reason,
                    },
                )
                .await
                .map(|()| range),
            Err(e) => Err(e),
        };
        match added {
            Ok(range) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Blocked {range} on resource {}.",
                params.resource_id
            ))])),
            Err(e) => Ok(tool_error(format!(
                "Failed to add blackout for '{}': {e}",
                params.resource_id
            ))),
        }
    }

    #[tool(
        name = "rental_search_available",
        description = "Find resources free for [start_date, end_date), optionally narrowed by equipment category (MOBILITY_SCOOTER, BABY_STROLLER) and daily rate bounds. A resource is excluded when a blocking booking or a blackout overlaps the range. Without dates, only the category and rate filters apply.",
        annotations(read_only_hint = true)
    )]
    async fn rental_search_available(
        &self,
        Parameters(params): Parameters<SearchAvailableToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let search = match params.into_search() {
            Ok(search) => search,
            Err(e) => return Ok(tool_error(format!("Search failed: {e}"))),
        };
        match self.service.search_available(&search).await {
            Ok(found) => {
                let mut text = String::new();
                match &search.range {
                    Some(range) => {
                        let _ = writeln!(text, "# Available for {range}");
                    }
                    None => {
                        let _ = writeln!(text, "# Resources");
                    }
                }
                if found.is_empty() {
                    let _ = writeln!(text, "\nNo resources match. Try other dates or wider filters.");
                } else {
                    let _ = writeln!(text, "{} match(es):\n", found.len());
                    for resource in &found {
                        let category = resource
                            .equipment
                            .as_ref()
                            .map_or("uncategorised", |e| e.category().as_str());
                        let _ = writeln!(
                            text,
                            "- {}: {} {}/day ({category})",
                            resource.id, resource.daily_rate, self.currency
                        );
                    }
                }
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(tool_error(format!("Search failed: {e}"))),
        }
    }

    #[tool(
        name = "rental_unavailable_dates",
        description = "List every date window a resource cannot be booked for, sorted by start date, with the reason (\"booked\" or the blackout reason).",
        annotations(read_only_hint = true)
    )]
    async fn rental_unavailable_dates(
        &self,
        Parameters(params): Parameters<ResourceIdToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.service.unavailable_windows(&params.resource_id).await {
            Ok(windows) => {
                let mut text = String::new();
                if windows.is_empty() {
                    let _ = writeln!(
                        text,
                        "Resource {} has no unavailable dates.",
                        params.resource_id
                    );
                } else {
                    let _ = writeln!(
                        text,
                        "Unavailable dates for {} ({} window(s)):\n",
                        params.resource_id,
                        windows.len()
                    );
                    for window in &windows {
                        let _ = writeln!(text, "- {}: {}", window.range, window.reason);
                    }
                }
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(tool_error(format!(
                "Failed to list unavailable dates for '{}': {e}",
                params.resource_id
            ))),
        }
    }
}

fn template(uri_template: &str, name: &str, title: &str, description: &str) -> ResourceTemplate {
    ResourceTemplate {
        annotations: None,
        raw: RawResourceTemplate {
            uri_template: uri_template.into(),
            name: name.into(),
            title: Some(title.into()),
            description: Some(description.into()),
            mime_type: Some("text/plain".into()),
            icons: None,
        },
    }
}

#[tool_handler]
impl ServerHandler for ScoovioMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Availability and pricing engine for peer-to-peer equipment rentals \
                 (mobility scooters, baby strollers).\n\
                 \n\
                 ## Dates\n\
                 All ranges are [start_date, end_date) in YYYY-MM-DD. The end date is the return \
                 day: a booking ending on the 15th does not block one starting on the 15th.\n\
                 \n\
                 ## Tools\n\
                 - rental_register_resource: add a resource with its rates and rental-length bounds\n\
                 - rental_get_resource: show a resource\n\
                 - rental_check_availability: is a range free, and is its length allowed\n\
                 - rental_quote_price: price breakdown (tier, service fee, tax, deposit)\n\
                 - rental_create_booking: book a range (stored as CONFIRMED)\n\
                 - rental_update_booking_status: confirm, start, complete or cancel a booking\n\
                 - rental_list_bookings: bookings of a resource, optionally by status\n\
                 - rental_add_blackout: block dates for maintenance or owner use\n\
                 - rental_unavailable_dates: every blocked window with its reason\n\
                 - rental_search_available: resources free for a range, by category and daily rate\n\
                 \n\
                 ## Resources\n\
                 Quotes and bookings are kept as MCP resources under scoovio://quote/{resource_id} \
                 and scoovio://booking/{id}."
                    .into(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let entries = self.resources.list().await;
        let resources: Vec<Resource> = entries
            .into_iter()
            .map(|(uri, name)| Resource {
                annotations: None,
                raw: RawResource {
                    uri,
                    name,
                    title: None,
                    description: None,
                    mime_type: Some("text/plain".into()),
                    size: None,
                    icons: None,
                    meta: None,
                },
            })
            .collect();
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = vec![
            template(
                "scoovio://resource/{id}",
                "Rental Resource",
                "Registered resource",
                "Rates and rental bounds (stored by rental_register_resource)",
            ),
            template(
                "scoovio://quote/{resource_id}",
                "Price Quote",
                "Latest price quote",
                "Most recent quote for a resource (stored by rental_quote_price)",
            ),
            template(
                "scoovio://booking/{id}",
                "Booking",
                "Booking record",
                "Booking details and price (stored by rental_create_booking)",
            ),
        ];
        Ok(ListResourceTemplatesResult {
            resource_templates: templates,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match self.resources.get(&request.uri).await {
            Some(entry) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(entry.text, request.uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("resource not found: {}", request.uri),
                None,
            )),
        }
    }
}
