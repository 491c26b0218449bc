//! OpenAPI description of the remote ordering API, for hosts that consume
//! plain HTTP actions instead of MCP.

use serde_json::{json, Value};

pub fn openapi_document(api_url: &str) -> Value {
    let string = json!({ "type": "string" });
    let order_item = json!({
        "type": "object",
        "required": ["item_id", "name", "price", "quantity"],
        "properties": {
            "item_id": string,
            "name": string,
            "price": { "type": "number" },
            "quantity": { "type": "integer", "minimum": 1 }
        }
    });

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Food Ordering MCP API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "AI-powered food ordering system with MCP integration"
        },
        "servers": [{ "url": api_url, "description": "Ordering API" }],
        "paths": {
            "/cities": {
                "get": {
                    "operationId": "getCities",
                    "summary": "Get available cities",
                    "description": "Returns list of cities where food delivery is available",
                    "responses": {
                        "200": json_response("List of cities", json!({
                            "type": "object",
                            "properties": { "cities": { "type": "array", "items": string } }
                        }))
                    }
                }
            },
            "/cuisines": {
                "get": {
                    "operationId": "getCuisines",
                    "summary": "Get available cuisines",
                    "description": "Returns list of available cuisine types",
                    "responses": {
                        "200": json_response("List of cuisines", json!({
                            "type": "object",
                            "properties": { "cuisines": { "type": "array", "items": string } }
                        }))
                    }
                }
            },
            "/restaurants/search": {
                "get": {
                    "operationId": "searchRestaurants",
                    "summary": "Search restaurants",
                    "description": "Search for restaurants by city and/or cuisine",
                    "parameters": [
                        { "name": "city", "in": "query", "schema": string, "description": "Filter by city" },
                        { "name": "cuisine", "in": "query", "schema": string, "description": "Filter by cuisine type" }
                    ],
                    "responses": {
                        "200": json_response("List of restaurants", json!({
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": string,
                                    "name": string,
                                    "cuisine": string,
                                    "rating": { "type": "number" },
                                    "price_range": string,
                                    "delivery_time": string,
                                    "minimum_order": { "type": "number" },
                                    "delivery_fee": { "type": "number" }
                                }
                            }
                        }))
                    }
                }
            },
            "/restaurants/{restaurant_id}/menu": {
                "get": {
                    "operationId": "getMenu",
                    "summary": "Get restaurant menu",
                    "description": "Get the complete menu for a specific restaurant",
                    "parameters": [{
                        "name": "restaurant_id",
                        "in": "path",
                        "required": true,
                        "schema": string,
                        "description": "Restaurant ID"
                    }],
                    "responses": {
                        "200": json_response("Restaurant menu", json!({
                            "type": "object",
                            "properties": {
                                "categories": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "name": string,
                                            "items": {
                                                "type": "array",
                                                "items": {
                                                    "type": "object",
                                                    "properties": {
                                                        "id": string,
                                                        "name": string,
                                                        "description": string,
                                                        "price": { "type": "number" },
                                                        "vegetarian": { "type": "boolean" },
                                                        "spicy": { "type": "boolean" },
                                                        "popular": { "type": "boolean" }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }))
                    }
                }
            },
            "/orders/create": {
                "post": {
                    "operationId": "createOrder",
                    "summary": "Create order",
                    "description": "Place a new food order",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": ["restaurant_id", "items", "delivery_address"],
                                    "properties": {
                                        "restaurant_id": string,
                                        "items": { "type": "array", "items": order_item },
                                        "delivery_address": {
                                            "type": "object",
                                            "required": ["address", "city", "state", "zip"],
                                            "properties": {
                                                "address": string,
                                                "city": string,
                                                "state": string,
                                                "zip": string
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("Created order", json!({
                            "type": "object",
                            "properties": {
                                "id": string,
                                "status": string,
                                "subtotal": { "type": "number" },
                                "delivery_fee": { "type": "number" },
                                "tax": { "type": "number" },
                                "total": { "type": "number" },
                                "estimated_delivery": string
                            }
                        }))
                    }
                }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}
